use std::cell::Cell;

use tracing::debug;

use super::ResolvedPlace;
use crate::error::{Result, SencityError};

/// Visible map region: a centre and positive latitude/longitude spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lat: f64,
    pub lng: f64,
    pub lat_delta: f64,
    pub lng_delta: f64,
}

impl Viewport {
    /// Validated constructor. Deltas must be finite and strictly positive.
    pub fn new(lat: f64, lng: f64, lat_delta: f64, lng_delta: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(SencityError::ConfigError(format!(
                "Viewport centre must be finite, got ({lat}, {lng})"
            )));
        }
        if !is_positive(lat_delta) || !is_positive(lng_delta) {
            return Err(SencityError::ConfigError(format!(
                "Viewport deltas must be positive, got ({lat_delta}, {lng_delta})"
            )));
        }
        Ok(Self {
            lat,
            lng,
            lat_delta,
            lng_delta,
        })
    }

    /// Square viewport of `delta` centred on `place`.
    pub fn centered_on(place: &ResolvedPlace, delta: f64) -> Result<Self> {
        Self::new(place.lat, place.lng, delta, delta)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Keeps the viewport centred on the newest cached place.
#[derive(Debug)]
pub struct ViewportSynchronizer {
    delta: f64,
    current: Cell<Viewport>,
}

impl ViewportSynchronizer {
    /// `initial` is the viewport used until the first place is added.
    pub fn new(delta: f64, initial: Viewport) -> Result<Self> {
        if !is_positive(delta) {
            return Err(SencityError::ConfigError(format!(
                "Zoom delta must be positive, got {delta}"
            )));
        }
        Ok(Self {
            delta,
            current: Cell::new(initial),
        })
    }

    pub fn current(&self) -> Viewport {
        self.current.get()
    }

    /// Recentres on `place` with the configured delta and returns the new viewport.
    ///
    /// A place with a non-finite coordinate leaves the viewport where it was.
    pub fn on_place_added(&self, place: &ResolvedPlace) -> Viewport {
        match Viewport::centered_on(place, self.delta) {
            Ok(viewport) => {
                debug!(lat = viewport.lat, lng = viewport.lng, "Recentred viewport");
                self.current.set(viewport);
                viewport
            }
            Err(e) => {
                debug!(error = %e, id = %place.id, "Ignoring place for viewport");
                self.current.get()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seoul() -> Viewport {
        Viewport::new(37.5665, 126.978, 0.01, 0.01).unwrap()
    }

    #[test]
    fn test_viewport_rejects_non_positive_deltas() {
        assert!(Viewport::new(37.0, 127.0, 0.0, 0.01).is_err());
        assert!(Viewport::new(37.0, 127.0, 0.01, -0.5).is_err());
        assert!(Viewport::new(37.0, 127.0, f64::NAN, 0.01).is_err());
        assert!(Viewport::new(f64::INFINITY, 127.0, 0.01, 0.01).is_err());
    }

    #[test]
    fn test_synchronizer_rejects_bad_delta() {
        assert!(ViewportSynchronizer::new(0.0, seoul()).is_err());
        assert!(ViewportSynchronizer::new(f64::INFINITY, seoul()).is_err());
    }

    #[test]
    fn test_recentres_on_added_place() {
        let sync = ViewportSynchronizer::new(0.02, seoul()).unwrap();
        let place = ResolvedPlace::new("p", "남산타워", "서울특별시 용산구", 37.5512, 126.9882);

        let viewport = sync.on_place_added(&place);
        assert_eq!(viewport, sync.current());
        assert!((viewport.lat - 37.5512).abs() < f64::EPSILON);
        assert!((viewport.lng - 126.9882).abs() < f64::EPSILON);
        assert!((viewport.lat_delta - 0.02).abs() < f64::EPSILON);
        assert!((viewport.lng_delta - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_place_keeps_viewport() {
        let sync = ViewportSynchronizer::new(0.01, seoul()).unwrap();
        let place = ResolvedPlace::new("bad", "?", "", f64::NAN, 127.0);
        assert_eq!(sync.on_place_added(&place), seoul());
    }
}
