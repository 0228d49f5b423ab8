//! The search dispatcher: the single entry point behind the map's search box.
//!
//! [`SearchDispatcher`] classifies a query, hands it to exactly one resolver and applies the
//! answer to client state. It owns the [`HistoryStore`], the [`PlaceCache`], the
//! [`ProfileSlot`] and the [`ViewportSynchronizer`], and raises a [`Notification`] for every
//! failure.
//!
//! # Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use std::sync::Arc;
//!
//! use sencity::services::PlaceResult;
//! use sencity::services::test_data::{
//!     InMemoryHistoryService, ScriptedAnimalInfoService, ScriptedPlaceSearchService,
//!     animal_payload,
//! };
//! use sencity::{CollectingNotifier, DispatchOutcome, SearchDispatcher};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), sencity::error::SencityError> {
//! let notifier = Rc::new(CollectingNotifier::new());
//! let dispatcher = SearchDispatcher::builder()
//!     .history_service(Arc::new(InMemoryHistoryService::new()))
//!     .animal_service(Arc::new(
//!         ScriptedAnimalInfoService::new().with_profile(animal_payload("고라니", "Water deer")),
//!     ))
//!     .place_service(Arc::new(ScriptedPlaceSearchService::new().with_results(
//!         "서울역",
//!         vec![PlaceResult::new("p1", "서울역", "서울특별시 용산구", 37.5547, 126.9707)],
//!     )))
//!     .notifier(notifier.clone())
//!     .build()?;
//!
//! assert!(dispatcher.dispatch("고라니").await.is_success());
//! assert!(matches!(
//!     dispatcher.dispatch("서울역").await,
//!     DispatchOutcome::Place { added: true, .. }
//! ));
//! assert_eq!(dispatcher.history().len(), 2);
//! # Ok(())
//! # }
//! ```
use std::rc::Rc;
use std::sync::Arc;

use sencity_services::{AnimalInfoService, HistoryService, PlaceSearchService};
use tracing::{debug, info, instrument};

use crate::{
    classify::{Classifier, QueryDomain, SpeciesClassifier},
    config::SearchConfig,
    error::{Result, SencityError},
    history::{Freshness, HistoryStore, SearchHistoryEntry},
    notify::{Notification, Notifier, TracingNotifier},
    places::{MapSurface, Marker, PlaceCache, ResolvedPlace, Viewport, ViewportSynchronizer},
    profile::{AnimalProfile, ProfileSlot},
    resolve::{AnimalResolver, PlaceResolver, SearchFailure},
    sequence::SequenceGate,
};

/// What a single dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The input was rejected before any network call.
    Rejected(SearchFailure),
    /// A species profile was fetched and is now displayed.
    Species { name: String },
    /// A place was resolved. `added` is `false` when its id was already cached.
    Place { id: String, added: bool },
    /// The resolver failed; a notification was raised and no state changed.
    Failed(SearchFailure),
    /// A newer dispatch of the same kind already applied its response.
    Superseded,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Species { .. } | Self::Place { .. })
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        match self {
            Self::Rejected(failure) | Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Builder for [`SearchDispatcher`]. All three services are required.
#[derive(Default)]
pub struct SearchDispatcherBuilder {
    history: Option<Arc<dyn HistoryService>>,
    animals: Option<Arc<dyn AnimalInfoService>>,
    places: Option<Arc<dyn PlaceSearchService>>,
    config: SearchConfig,
    classifier: Option<Box<dyn Classifier>>,
    notifier: Option<Rc<dyn Notifier>>,
    surface: Option<Rc<dyn MapSurface>>,
}

impl SearchDispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_service(mut self, service: Arc<dyn HistoryService>) -> Self {
        self.history = Some(service);
        self
    }

    pub fn animal_service(mut self, service: Arc<dyn AnimalInfoService>) -> Self {
        self.animals = Some(service);
        self
    }

    pub fn place_service(mut self, service: Arc<dyn PlaceSearchService>) -> Self {
        self.places = Some(service);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the species classifier built from `config.species`
    pub fn classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Where notifications go. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn map_surface(mut self, surface: Rc<dyn MapSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn build(self) -> Result<SearchDispatcher> {
        let missing = |name: &str| SencityError::ConfigError(format!("{name} service is required"));
        let history = self.history.ok_or_else(|| missing("History"))?;
        let animals = self.animals.ok_or_else(|| missing("Animal info"))?;
        let places = self.places.ok_or_else(|| missing("Place search"))?;

        let config = self.config;
        let cache = PlaceCache::with_initial(config.initial_places.iter().cloned());
        let initial = match cache.last() {
            Some(place) => Viewport::centered_on(&place, config.zoom_delta)?,
            None => {
                let (lat, lng) = config.fallback_center;
                Viewport::new(lat, lng, config.zoom_delta, config.zoom_delta)?
            }
        };
        let viewport = ViewportSynchronizer::new(config.zoom_delta, initial)?;

        let classifier = self
            .classifier
            .unwrap_or_else(|| Box::new(SpeciesClassifier::new(config.species)));

        Ok(SearchDispatcher {
            classifier,
            animals: AnimalResolver::new(animals),
            places: PlaceResolver::new(places),
            history: HistoryStore::new(history),
            profile: ProfileSlot::default(),
            cache,
            viewport,
            notifier: self.notifier.unwrap_or_else(|| Rc::new(TracingNotifier)),
            surface: self.surface,
            animal_requests: SequenceGate::default(),
            place_requests: SequenceGate::default(),
        })
    }
}

/// Routes search input to the animal or place resolver and reconciles client state.
///
/// Methods take `&self` so several dispatches can be awaited concurrently from one task.
/// The dispatcher is not `Sync`; drive it with `futures::join!` or a `LocalSet`.
pub struct SearchDispatcher {
    classifier: Box<dyn Classifier>,
    animals: AnimalResolver,
    places: PlaceResolver,
    history: HistoryStore,
    profile: ProfileSlot,
    cache: PlaceCache,
    viewport: ViewportSynchronizer,
    notifier: Rc<dyn Notifier>,
    surface: Option<Rc<dyn MapSurface>>,
    animal_requests: SequenceGate,
    place_requests: SequenceGate,
}

impl SearchDispatcher {
    pub fn builder() -> SearchDispatcherBuilder {
        SearchDispatcherBuilder::new()
    }

    /// Dispatcher backed by the HTTP services described by `endpoints`.
    #[cfg(feature = "http")]
    pub fn from_endpoints(
        endpoints: sencity_services::ServiceEndpoints,
        config: SearchConfig,
    ) -> Result<Self> {
        use sencity_services::http::{GooglePlacesClient, SencityBackend};

        let backend = Arc::new(SencityBackend::new(endpoints.clone())?);
        let places = Arc::new(GooglePlacesClient::new(endpoints)?);
        Self::builder()
            .history_service(backend.clone())
            .animal_service(backend)
            .place_service(places)
            .config(config)
            .build()
    }

    /// Handles one submitted query.
    ///
    /// Empty input is rejected without a network call. Otherwise exactly one resolver runs,
    /// and on success the query is appended to the history unless already present.
    #[instrument(name = "Dispatch search", skip(self), level = "info")]
    pub async fn dispatch(&self, raw: &str) -> DispatchOutcome {
        let query = raw.trim();
        if query.is_empty() {
            debug!("Rejecting empty search input");
            return DispatchOutcome::Rejected(SearchFailure::ValidationFailure);
        }

        match self.classifier.classify(query) {
            QueryDomain::Species => self.dispatch_species(query).await,
            QueryDomain::Place => self.dispatch_place(query).await,
        }
    }

    async fn dispatch_species(&self, name: &str) -> DispatchOutcome {
        let ticket = self.animal_requests.issue();
        let resolved = self.animals.resolve(name).await;
        if !self.animal_requests.try_apply(ticket) {
            debug!(name, "Discarding superseded animal response");
            return DispatchOutcome::Superseded;
        }

        match resolved {
            Ok(profile) => {
                info!(name = %profile.name, "Showing animal profile");
                let shown = profile.name.clone();
                self.profile.replace(profile);
                self.remember(name).await;
                self.history.clear_selection();
                DispatchOutcome::Species { name: shown }
            }
            Err(failure) => self.fail(failure),
        }
    }

    async fn dispatch_place(&self, query: &str) -> DispatchOutcome {
        let ticket = self.place_requests.issue();
        let resolved = self.places.resolve(query).await;
        if !self.place_requests.try_apply(ticket) {
            debug!(query, "Discarding superseded place response");
            return DispatchOutcome::Superseded;
        }

        match resolved {
            Ok(place) => {
                let id = place.id.clone();
                let label = place.label.clone();
                let added = self.cache.insert(place.clone());
                if added {
                    self.viewport.on_place_added(&place);
                    self.render_map();
                }
                self.remember(query).await;
                self.history.clear_selection();
                self.notifier.notify(&Notification::info("Place saved", label));
                DispatchOutcome::Place { id, added }
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Appends `keyword` to the history unless the deduplicated view already has it.
    async fn remember(&self, keyword: &str) {
        if self.history.contains_keyword(keyword) {
            debug!(keyword, "Keyword already in history");
            return;
        }
        self.history.add(keyword).await;
    }

    fn fail(&self, failure: SearchFailure) -> DispatchOutcome {
        self.notifier
            .notify(&Notification::failure(failure.title(), failure.to_string()));
        DispatchOutcome::Failed(failure)
    }

    /// Fetches the history once, typically at start-up.
    pub async fn load_history(&self) {
        self.history.refresh().await;
    }

    /// Selects the history row `id` and searches its keyword again.
    ///
    /// Unknown ids are rejected without a network call.
    #[instrument(name = "Select history entry", skip(self), level = "info")]
    pub async fn select_history(&self, id: i64) -> DispatchOutcome {
        match self.history.select(id) {
            Some(entry) => self.dispatch(&entry.keyword).await,
            None => {
                debug!(id, "No history entry with this id");
                DispatchOutcome::Rejected(SearchFailure::ValidationFailure)
            }
        }
    }

    /// Deletes the history row `id`. A failed delete raises a notification.
    #[instrument(name = "Remove history entry", skip(self), level = "info")]
    pub async fn remove_history(&self, id: i64) -> bool {
        let removed = self.history.remove(id).await;
        if !removed {
            self.notifier.notify(&Notification::failure(
                "Delete failed",
                "Could not delete the search history entry",
            ));
        }
        removed
    }

    /// Pushes the current viewport and all markers to the map surface, if one is attached.
    pub fn render_map(&self) {
        if let Some(surface) = &self.surface {
            surface.render(&self.viewport.current(), &self.cache.markers());
        }
    }

    pub fn history(&self) -> Vec<SearchHistoryEntry> {
        self.history.list()
    }

    pub fn history_freshness(&self) -> Freshness {
        self.history.freshness()
    }

    pub fn selected_history(&self) -> Option<i64> {
        self.history.selected()
    }

    pub fn profile(&self) -> Option<AnimalProfile> {
        self.profile.current()
    }

    pub fn places(&self) -> Vec<ResolvedPlace> {
        self.cache.snapshot()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.cache.markers()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.current()
    }
}

impl std::fmt::Debug for SearchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDispatcher")
            .field("history", &self.history)
            .field("places", &self.cache.len())
            .field("viewport", &self.viewport.current())
            .finish_non_exhaustive()
    }
}
