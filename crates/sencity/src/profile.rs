use std::cell::RefCell;

use sencity_services::AnimalInfoPayload;

/// Description of a species as shown in the info tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalProfile {
    pub name: String,
    pub english_name: String,
    pub image_url: String,
    pub features: Vec<String>,
    pub precautions: Vec<String>,
}

impl AnimalProfile {
    /// Builds a profile from a service payload. `None` when the payload has no usable name.
    pub fn from_payload(payload: AnimalInfoPayload) -> Option<Self> {
        let name = payload.name.map(|n| n.trim().to_string())?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            english_name: payload.english.unwrap_or_default(),
            image_url: payload.image_url.unwrap_or_default(),
            features: payload.features.unwrap_or_default(),
            precautions: payload.precautions.unwrap_or_default(),
        })
    }
}

/// Holds the currently displayed profile, if any.
#[derive(Debug, Default)]
pub struct ProfileSlot {
    current: RefCell<Option<AnimalProfile>>,
}

impl ProfileSlot {
    pub fn current(&self) -> Option<AnimalProfile> {
        self.current.borrow().clone()
    }

    /// Replaces the displayed profile wholesale, returning the previous one.
    pub fn replace(&self, profile: AnimalProfile) -> Option<AnimalProfile> {
        self.current.replace(Some(profile))
    }
}
