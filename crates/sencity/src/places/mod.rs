//! Session-lived cache of resolved places and the map state derived from it.
use std::cell::RefCell;
use std::fmt;

use sencity_services::PlaceResult;
use tracing::debug;

mod viewport;
pub use viewport::{Viewport, ViewportSynchronizer};

/// A geocoded place shown as a marker on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    /// External place identifier assigned by the place search service.
    pub id: String,
    pub label: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl ResolvedPlace {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            address: address.into(),
            lat,
            lng,
        }
    }
}

impl From<PlaceResult> for ResolvedPlace {
    fn from(result: PlaceResult) -> Self {
        Self {
            id: result.place_id,
            label: result.name,
            address: result.formatted_address,
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
        }
    }
}

impl fmt::Display for ResolvedPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) @ {:.5},{:.5}", self.label, self.address, self.lat, self.lng)
    }
}

/// What the map surface draws for one place.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: String,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&ResolvedPlace> for Marker {
    fn from(place: &ResolvedPlace) -> Self {
        Self {
            key: place.id.clone(),
            title: place.label.clone(),
            description: place.address.clone(),
            lat: place.lat,
            lng: place.lng,
        }
    }
}

/// Rendering surface fed with the current viewport and every marker.
pub trait MapSurface {
    fn render(&self, viewport: &Viewport, markers: &[Marker]);
}

/// Append-only list of places, unique by id. The first place stored under an id wins.
#[derive(Debug, Default)]
pub struct PlaceCache {
    places: RefCell<Vec<ResolvedPlace>>,
}

impl PlaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with `initial`. Duplicate ids in the seed keep their first occurrence.
    pub fn with_initial(initial: impl IntoIterator<Item = ResolvedPlace>) -> Self {
        let cache = Self::new();
        for place in initial {
            cache.insert(place);
        }
        cache
    }

    /// Appends `place` unless its id is already cached. Returns whether it was appended.
    pub fn insert(&self, place: ResolvedPlace) -> bool {
        let mut places = self.places.borrow_mut();
        if places.iter().any(|p| p.id == place.id) {
            debug!(id = %place.id, "Place already cached, keeping existing entry");
            return false;
        }
        debug!(id = %place.id, label = %place.label, "Caching place");
        places.push(place);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.places.borrow().iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<ResolvedPlace> {
        self.places.borrow().iter().find(|p| p.id == id).cloned()
    }

    /// Most recently appended place.
    pub fn last(&self) -> Option<ResolvedPlace> {
        self.places.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.places.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<ResolvedPlace> {
        self.places.borrow().clone()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.places.borrow().iter().map(Marker::from).collect()
    }
}
