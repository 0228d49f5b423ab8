use crate::{
    classify::DEFAULT_SPECIES,
    error::{Result, SencityError},
    places::ResolvedPlace,
};

/// Default span of the viewport around a newly added place, in degrees.
pub const DEFAULT_ZOOM_DELTA: f64 = 0.01;

/// Map centre used while no place is cached (Seoul City Hall).
pub const DEFAULT_FALLBACK_CENTER: (f64, f64) = (37.5665, 126.978);

/// Client-side configuration of the search dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Names routed to the animal knowledge service. Matched exactly.
    pub species: Vec<String>,
    /// Latitude and longitude span of the viewport after a place is added.
    pub zoom_delta: f64,
    /// Places the cache starts with. The viewport starts on the last one.
    pub initial_places: Vec<ResolvedPlace>,
    /// `(lat, lng)` of the initial viewport when `initial_places` is empty.
    pub fallback_center: (f64, f64),
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            species: DEFAULT_SPECIES.iter().map(ToString::to_string).collect(),
            zoom_delta: DEFAULT_ZOOM_DELTA,
            initial_places: Vec::new(),
            fallback_center: DEFAULT_FALLBACK_CENTER,
        }
    }
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

/// Builder for creating search configurations with validated values
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder starting from [`SearchConfig::default`]
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Replace the species set
    pub fn species<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.species = species.into_iter().map(Into::into).collect();
        self
    }

    /// Add one species name to the current set
    pub fn add_species(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.species.contains(&name) {
            self.config.species.push(name);
        }
        self
    }

    /// Set the viewport span used when recentring (must be finite and positive)
    pub fn zoom_delta(mut self, delta: f64) -> Result<Self> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(SencityError::ConfigError(format!(
                "Zoom delta must be positive, got {delta}"
            )));
        }
        self.config.zoom_delta = delta;
        Ok(self)
    }

    /// Replace the places the cache is seeded with
    pub fn initial_places(mut self, places: impl IntoIterator<Item = ResolvedPlace>) -> Self {
        self.config.initial_places = places.into_iter().collect();
        self
    }

    pub fn add_initial_place(mut self, place: ResolvedPlace) -> Self {
        self.config.initial_places.push(place);
        self
    }

    /// Set the map centre used while the cache is empty
    pub fn fallback_center(mut self, lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(SencityError::ConfigError(format!(
                "Fallback centre out of range, got ({lat}, {lng})"
            )));
        }
        self.config.fallback_center = (lat, lng);
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> SearchConfig {
        self.config
    }
}
