//! Sencity - Map Search Dispatch Library
//!
//! Sencity powers the search box of a wildlife map. Free text typed by the user is classified
//! either as a **species name** or as a **place**, routed to the matching remote service, and
//! the answer is reconciled into client state: the search history, the list of resolved
//! places shown as markers, the map viewport, and the currently displayed animal profile.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sencity::services::ServiceEndpoints;
//! use sencity::services::http::{GooglePlacesClient, SencityBackend};
//! use sencity::{SearchConfig, SearchDispatcher};
//!
//! # async fn run() -> Result<(), sencity::error::SencityError> {
//! let endpoints = ServiceEndpoints::from_env();
//! let backend = Arc::new(SencityBackend::new(endpoints.clone())?);
//! let places = Arc::new(GooglePlacesClient::new(endpoints)?);
//!
//! let dispatcher = SearchDispatcher::builder()
//!     .history_service(backend.clone())
//!     .animal_service(backend)
//!     .place_service(places)
//!     .config(SearchConfig::default())
//!     .build()?;
//!
//! dispatcher.load_history().await;
//! dispatcher.dispatch("고라니").await; // species lookup
//! dispatcher.dispatch("서울역").await; // place lookup
//!
//! println!("{:?}", dispatcher.profile());
//! println!("{:?}", dispatcher.viewport());
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Everything runs on one logical thread. Several dispatches may be in flight at once; each
//! resolver kind hands out increasing sequence numbers and a response older than one already
//! applied is discarded instead of overwriting newer state.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod classify;
mod config;
mod core;
pub mod error;
mod history;
mod notify;
mod places;
mod profile;
mod resolve;
mod sequence;

pub use classify::{Classifier, DEFAULT_SPECIES, QueryDomain, SpeciesClassifier};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use crate::core::{DispatchOutcome, SearchDispatcher, SearchDispatcherBuilder};
pub use history::{Freshness, HistoryStore, SearchHistoryEntry, deduplicate};
pub use notify::{CollectingNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use places::{MapSurface, Marker, PlaceCache, ResolvedPlace, Viewport, ViewportSynchronizer};
pub use profile::{AnimalProfile, ProfileSlot};
pub use resolve::{AnimalResolver, PlaceResolver, SearchFailure};
pub use sencity_services as services;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Sencity library.
///
/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` when set, or by `level`
/// otherwise. Calling it again is a no-op.
///
/// ```rust
/// use sencity::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), sencity::error::SencityError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::SencityError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        assert!(init_logging(tracing::Level::WARN).is_ok());
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }
}
