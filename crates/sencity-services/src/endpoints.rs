use std::time::Duration;

use tracing::debug;

pub const DEFAULT_BACKEND_URL: &str = "http://10.0.2.2:8000/api";
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
pub const DEFAULT_LANGUAGE: &str = "ko";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Where the remote services live and how to talk to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Base URL of the history and animal knowledge backend, without a trailing slash.
    pub backend_url: String,
    /// Full URL of the place text search endpoint.
    pub places_url: String,
    /// API key sent to the place search service.
    pub places_api_key: String,
    /// Result language requested from the place search service.
    pub language: String,
    pub timeout: Duration,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            places_url: DEFAULT_PLACES_URL.to_string(),
            places_api_key: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl ServiceEndpoints {
    /// Defaults overridden by `SENCITY_BACKEND_URL`, `SENCITY_PLACES_URL`, `GOOGLE_API_KEY`
    /// and `SENCITY_PLACES_LANGUAGE` when they are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut endpoints = Self::default();
        if let Some(url) = lookup("SENCITY_BACKEND_URL") {
            endpoints.backend_url = url;
        }
        if let Some(url) = lookup("SENCITY_PLACES_URL") {
            endpoints.places_url = url;
        }
        if let Some(key) = lookup("GOOGLE_API_KEY") {
            endpoints.places_api_key = key;
        }
        if let Some(language) = lookup("SENCITY_PLACES_LANGUAGE") {
            endpoints.language = language;
        }
        debug!(
            backend_url = %endpoints.backend_url,
            places_url = %endpoints.places_url,
            has_api_key = !endpoints.places_api_key.is_empty(),
            "Resolved service endpoints"
        );
        endpoints
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_places_api_key(mut self, key: impl Into<String>) -> Self {
        self.places_api_key = key.into();
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn search_history_url(&self) -> String {
        format!("{}/search-history", self.backend_url.trim_end_matches('/'))
    }

    pub fn search_history_entry_url(&self, id: i64) -> String {
        format!("{}/{id}", self.search_history_url())
    }

    pub fn animal_info_url(&self) -> String {
        format!("{}/animal-info", self.backend_url.trim_end_matches('/'))
    }
}
