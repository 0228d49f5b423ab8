//! Resolvers turn one classified query into a domain value or a [`SearchFailure`].
//!
//! They are stateless. Applying the result to client state is the dispatcher's job.
use std::sync::Arc;

use sencity_services::{AnimalInfoService, PlaceSearchService, PlaceSearchStatus, ServiceError};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::places::ResolvedPlace;
use crate::profile::AnimalProfile;

/// Why a search produced nothing to show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    #[error("Search input is empty")]
    ValidationFailure,
    #[error("No animal information found for '{query}'")]
    NotFound { query: String },
    #[error("No place found for '{query}'")]
    EmptyResult { query: String },
    #[error("Search service error: {message}")]
    ServiceError { message: String },
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },
}

impl SearchFailure {
    /// `true` when the service answered but had no data, as opposed to the request failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyResult { .. })
    }

    /// Short heading for a notification about this failure.
    pub fn title(&self) -> &'static str {
        if self.is_not_found() {
            "Not found"
        } else {
            "Search failed"
        }
    }
}

/// Maps a transport-level error of the place or animal service.
fn failure_from_service(error: &ServiceError) -> SearchFailure {
    if error.status().is_some() {
        SearchFailure::ServiceError {
            message: error.to_string(),
        }
    } else {
        SearchFailure::NetworkFailure {
            message: error.to_string(),
        }
    }
}

pub struct AnimalResolver {
    service: Arc<dyn AnimalInfoService>,
}

impl AnimalResolver {
    pub fn new(service: Arc<dyn AnimalInfoService>) -> Self {
        Self { service }
    }

    /// Looks up the profile of species `name`.
    ///
    /// A 4xx status or a payload without a name is `NotFound`; other statuses are
    /// `ServiceError`; anything that never produced a status is `NetworkFailure`.
    #[instrument(name = "Resolve animal", skip(self), level = "debug")]
    pub async fn resolve(&self, name: &str) -> Result<AnimalProfile, SearchFailure> {
        let payload = match self.service.animal_info(name).await {
            Ok(payload) => payload,
            Err(e) if e.status().is_some_and(|s| (400..500).contains(&s)) => {
                debug!(error = %e, "Animal service rejected the name");
                return Err(SearchFailure::NotFound {
                    query: name.to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "Animal info request failed");
                return Err(failure_from_service(&e));
            }
        };

        AnimalProfile::from_payload(payload).ok_or_else(|| SearchFailure::NotFound {
            query: name.to_string(),
        })
    }
}

pub struct PlaceResolver {
    service: Arc<dyn PlaceSearchService>,
}

impl PlaceResolver {
    pub fn new(service: Arc<dyn PlaceSearchService>) -> Self {
        Self { service }
    }

    /// Resolves `query` to the first result of a text search.
    #[instrument(name = "Resolve place", skip(self), level = "debug")]
    pub async fn resolve(&self, query: &str) -> Result<ResolvedPlace, SearchFailure> {
        let response = self.service.text_search(query).await.map_err(|e| {
            warn!(error = %e, "Place search request failed");
            failure_from_service(&e)
        })?;

        match response.status {
            PlaceSearchStatus::Ok => response
                .results
                .into_iter()
                .next()
                .map(ResolvedPlace::from)
                .ok_or_else(|| SearchFailure::EmptyResult {
                    query: query.to_string(),
                }),
            PlaceSearchStatus::ZeroResults => Err(SearchFailure::EmptyResult {
                query: query.to_string(),
            }),
            PlaceSearchStatus::Error(status) => {
                let message = response
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("Place search returned {status}"));
                warn!(%status, %message, "Place search returned an error status");
                Err(SearchFailure::ServiceError { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sencity_services::test_data::{
        ScriptedAnimalInfoService, ScriptedFailure, ScriptedPlaceSearchService, animal_payload,
    };
    use sencity_services::{AnimalInfoPayload, PlaceResult, TextSearchResponse};

    use super::*;

    fn animals(service: ScriptedAnimalInfoService) -> AnimalResolver {
        AnimalResolver::new(Arc::new(service))
    }

    fn places(service: ScriptedPlaceSearchService) -> PlaceResolver {
        PlaceResolver::new(Arc::new(service))
    }

    #[tokio::test]
    async fn test_animal_found() {
        let resolver = animals(
            ScriptedAnimalInfoService::new().with_profile(animal_payload("고라니", "Water deer")),
        );
        let profile = resolver.resolve("고라니").await.unwrap();
        assert_eq!(profile.name, "고라니");
        assert_eq!(profile.english_name, "Water deer");
        assert_eq!(profile.precautions.len(), 2);
    }

    #[tokio::test]
    async fn test_animal_without_name_is_not_found() {
        let resolver = animals(
            ScriptedAnimalInfoService::new().with_payload("너구리", AnimalInfoPayload::default()),
        );
        let err = resolver.resolve("너구리").await.unwrap_err();
        assert_eq!(
            err,
            SearchFailure::NotFound {
                query: "너구리".to_string()
            }
        );
        assert!(err.is_not_found());
        assert_eq!(err.title(), "Not found");
    }

    #[tokio::test]
    async fn test_animal_status_mapping() {
        let resolver = animals(
            ScriptedAnimalInfoService::new()
                .with_failure("노루", ScriptedFailure::Status(404))
                .with_failure("멧돼지", ScriptedFailure::Status(502))
                .with_failure("족제비", ScriptedFailure::Transport("timed out".to_string())),
        );

        assert!(matches!(
            resolver.resolve("노루").await,
            Err(SearchFailure::NotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve("멧돼지").await,
            Err(SearchFailure::ServiceError { .. })
        ));
        let err = resolver.resolve("족제비").await.unwrap_err();
        assert!(matches!(err, SearchFailure::NetworkFailure { .. }));
        assert_eq!(err.title(), "Search failed");
    }

    #[tokio::test]
    async fn test_place_uses_first_result_only() {
        let resolver = places(ScriptedPlaceSearchService::new().with_results(
            "서울역",
            vec![
                PlaceResult::new("a", "서울역", "서울특별시 용산구 한강대로 405", 37.5547, 126.9707),
                PlaceResult::new("b", "서울역 버스환승센터", "서울특별시 중구", 37.5559, 126.9723),
            ],
        ));
        let place = resolver.resolve("서울역").await.unwrap();
        assert_eq!(place.id, "a");
        assert_eq!(place.label, "서울역");
    }

    #[tokio::test]
    async fn test_place_zero_results_and_empty_ok() {
        let resolver = places(ScriptedPlaceSearchService::new().with_results("빈곳", vec![]));

        assert_eq!(
            resolver.resolve("없는곳").await,
            Err(SearchFailure::EmptyResult {
                query: "없는곳".to_string()
            })
        );
        assert!(matches!(
            resolver.resolve("빈곳").await,
            Err(SearchFailure::EmptyResult { .. })
        ));
    }

    #[tokio::test]
    async fn test_place_error_status_carries_message() {
        let resolver = places(
            ScriptedPlaceSearchService::new()
                .with_response(
                    "denied",
                    TextSearchResponse::error("REQUEST_DENIED", Some("The provided API key is invalid.")),
                )
                .with_response("quota", TextSearchResponse::error("OVER_QUERY_LIMIT", None)),
        );

        assert_eq!(
            resolver.resolve("denied").await,
            Err(SearchFailure::ServiceError {
                message: "The provided API key is invalid.".to_string()
            })
        );
        match resolver.resolve("quota").await {
            Err(SearchFailure::ServiceError { message }) => {
                assert!(message.contains("OVER_QUERY_LIMIT"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_place_transport_errors() {
        let resolver = places(
            ScriptedPlaceSearchService::new()
                .with_failure("a", ScriptedFailure::Transport("dns".to_string()))
                .with_failure("b", ScriptedFailure::Status(500)),
        );
        assert!(matches!(
            resolver.resolve("a").await,
            Err(SearchFailure::NetworkFailure { .. })
        ));
        assert!(matches!(
            resolver.resolve("b").await,
            Err(SearchFailure::ServiceError { .. })
        ));
    }
}
