use serde::{Deserialize, Serialize};

/// One row of the history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub keyword: String,
}

/// Body of `/animal-info`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalInfoPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub precautions: Option<Vec<String>>,
}

/// Status field of a text search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlaceSearchStatus {
    Ok,
    ZeroResults,
    /// `REQUEST_DENIED`, `OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...
    Error(String),
}

impl From<String> for PlaceSearchStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            _ => Self::Error(value),
        }
    }
}

impl From<PlaceSearchStatus> for String {
    fn from(value: PlaceSearchStatus) -> Self {
        match value {
            PlaceSearchStatus::Ok => "OK".to_string(),
            PlaceSearchStatus::ZeroResults => "ZERO_RESULTS".to_string(),
            PlaceSearchStatus::Error(status) => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSearchResponse {
    pub status: PlaceSearchStatus,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TextSearchResponse {
    pub const fn ok(results: Vec<PlaceResult>) -> Self {
        Self {
            status: PlaceSearchStatus::Ok,
            results,
            error_message: None,
        }
    }

    pub const fn zero_results() -> Self {
        Self {
            status: PlaceSearchStatus::ZeroResults,
            results: Vec::new(),
            error_message: None,
        }
    }

    pub fn error(status: impl Into<String>, message: Option<&str>) -> Self {
        Self {
            status: PlaceSearchStatus::Error(status.into()),
            results: Vec::new(),
            error_message: message.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
}

impl PlaceResult {
    pub fn new(
        place_id: impl Into<String>,
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            formatted_address: formatted_address.into(),
            geometry: Geometry {
                location: LatLng { lat, lng },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_search_ok_response() {
        let body = r#"{
            "html_attributions": [],
            "results": [
                {
                    "formatted_address": "서울특별시 용산구 한강대로 405",
                    "geometry": {
                        "location": { "lat": 37.5546788, "lng": 126.9706069 },
                        "viewport": {}
                    },
                    "name": "서울역",
                    "place_id": "ChIJ7Yb0GdOifDURWR4x7B7E8lI",
                    "types": ["train_station"]
                },
                {
                    "formatted_address": "서울특별시 중구",
                    "geometry": { "location": { "lat": 37.55, "lng": 126.97 } },
                    "name": "서울역 버스환승센터",
                    "place_id": "second"
                }
            ],
            "status": "OK"
        }"#;

        let response: TextSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, PlaceSearchStatus::Ok);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].name, "서울역");
        assert_eq!(response.results[0].geometry.location.lat, 37.5546788);
        assert!(response.error_message.is_none());
    }

    #[test]
    fn test_text_search_zero_results() {
        let body = r#"{"html_attributions": [], "results": [], "status": "ZERO_RESULTS"}"#;
        let response: TextSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, PlaceSearchStatus::ZeroResults);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_text_search_error_status_keeps_message() {
        let body = r#"{
            "error_message": "The provided API key is invalid.",
            "results": [],
            "status": "REQUEST_DENIED"
        }"#;
        let response: TextSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.status,
            PlaceSearchStatus::Error("REQUEST_DENIED".to_string())
        );
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
    }

    #[test]
    fn test_text_search_missing_results_field() {
        let body = r#"{"status": "INVALID_REQUEST"}"#;
        let response: TextSearchResponse = serde_json::from_str(body).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_status_serializes_back_to_wire_string() {
        let json = serde_json::to_string(&TextSearchResponse::zero_results()).unwrap();
        assert!(json.contains(r#""status":"ZERO_RESULTS""#));
    }

    #[test]
    fn test_animal_payload_without_name() {
        let payload: AnimalInfoPayload = serde_json::from_str(r#"{"detail": "Not found."}"#).unwrap();
        assert!(payload.name.is_none());
        assert!(payload.features.is_none());
    }

    #[test]
    fn test_animal_payload_full() {
        let body = r#"{
            "name": "고라니",
            "english": "Water deer",
            "image_url": "https://example.org/water-deer.jpg",
            "features": ["송곳니가 길다"],
            "precautions": ["가까이 다가가지 않는다", "차량 운행 시 서행"]
        }"#;
        let payload: AnimalInfoPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.name.as_deref(), Some("고라니"));
        assert_eq!(payload.english.as_deref(), Some("Water deer"));
        assert_eq!(payload.precautions.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_history_records_keep_order() {
        let body = r#"[{"id": 3, "keyword": "노루"}, {"id": 1, "keyword": "서울역"}]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records[0].id, 3);
        assert_eq!(records[1].keyword, "서울역");
    }
}
