//! Remote collaborators of the Sencity map search.
//!
//! The map screen talks to three services:
//!
//! - the **history service** (`/search-history`), which owns past search keywords,
//! - the **animal knowledge service** (`/animal-info`), which describes a species,
//! - a third-party **place search service** (text search), which geocodes free text.
//!
//! This crate defines the wire types and one async trait per service. The `http` feature
//! (enabled by default) provides `reqwest`-backed clients; the `test_data` feature provides
//! scripted in-memory services for tests and local development.
use async_trait::async_trait;

mod endpoints;
mod types;

#[cfg(feature = "http")]
pub mod http;
#[cfg(any(test, feature = "test_data"))]
pub mod test_data;

pub use endpoints::ServiceEndpoints;
pub use error::{Result, ServiceError};
pub use types::{
    AnimalInfoPayload, Geometry, HistoryRecord, LatLng, PlaceResult, PlaceSearchStatus,
    TextSearchResponse,
};

/// Remote list/append/delete store of past search keywords.
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// `GET /search-history`, in the order the service returns them.
    async fn list(&self) -> Result<Vec<HistoryRecord>>;
    /// `POST /search-history` with `{"keyword": ...}`.
    async fn create(&self, keyword: &str) -> Result<()>;
    /// `DELETE /search-history/{id}`.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Species knowledge lookup.
#[async_trait]
pub trait AnimalInfoService: Send + Sync {
    /// `GET /animal-info?name=<name>`.
    ///
    /// A successful transport with a payload lacking `name` is returned as-is; deciding that
    /// such a payload means "not found" is up to the caller.
    async fn animal_info(&self, name: &str) -> Result<AnimalInfoPayload>;
}

/// Free-text place search.
#[async_trait]
pub trait PlaceSearchService: Send + Sync {
    /// Text search for `query`. Soft (`ZERO_RESULTS`) and hard (`REQUEST_DENIED`, ...) upstream
    /// statuses are reported inside the response, not as errors.
    async fn text_search(&self, query: &str) -> Result<TextSearchResponse>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ServiceError {
        #[cfg(feature = "http")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("{endpoint} responded with status {status}")]
        Status { endpoint: &'static str, status: u16 },
        #[error("Serialization error: {0}")]
        Serde(#[from] serde_json::Error),
        #[error("Transport error: {0}")]
        Transport(String),
        #[error("Invalid endpoint configuration: {0}")]
        InvalidEndpoint(String),
    }

    impl ServiceError {
        /// HTTP status code when the service answered with a non-success status.
        pub const fn status(&self) -> Option<u16> {
            match self {
                Self::Status { status, .. } => Some(*status),
                _ => None,
            }
        }
    }

    pub type Result<T> = std::result::Result<T, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ServiceError::Status {
            endpoint: "animal-info",
            status: 404,
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "animal-info responded with status 404");

        let err = ServiceError::Transport("connection reset".to_string());
        assert_eq!(err.status(), None);
    }
}
