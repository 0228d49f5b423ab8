//! `reqwest`-backed clients for the Sencity backend and the place search service.
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    AnimalInfoPayload, AnimalInfoService, HistoryRecord, HistoryService, PlaceSearchService,
    Result, ServiceEndpoints, ServiceError, TextSearchResponse,
};

fn build_client(endpoints: &ServiceEndpoints) -> Result<Client> {
    Ok(Client::builder().timeout(endpoints.timeout).build()?)
}

fn ensure_success(response: Response, endpoint: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(endpoint, status = status.as_u16(), "Service returned an error status");
        Err(ServiceError::Status {
            endpoint,
            status: status.as_u16(),
        })
    }
}

#[derive(Serialize)]
struct NewHistoryEntry<'a> {
    keyword: &'a str,
}

/// Client for the Sencity backend, which serves both search history and animal knowledge.
#[derive(Debug, Clone)]
pub struct SencityBackend {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl SencityBackend {
    pub fn new(endpoints: ServiceEndpoints) -> Result<Self> {
        if endpoints.backend_url.trim().is_empty() {
            return Err(ServiceError::InvalidEndpoint(
                "backend URL is empty".to_string(),
            ));
        }
        Ok(Self {
            client: build_client(&endpoints)?,
            endpoints,
        })
    }
}

#[async_trait]
impl HistoryService for SencityBackend {
    #[instrument(name = "List search history", skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<HistoryRecord>> {
        let response = self
            .client
            .get(self.endpoints.search_history_url())
            .send()
            .await?;
        let records: Vec<HistoryRecord> = ensure_success(response, "search-history")?
            .json()
            .await?;
        debug!(count = records.len(), "Fetched search history");
        Ok(records)
    }

    #[instrument(name = "Create search history entry", skip(self), level = "debug")]
    async fn create(&self, keyword: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoints.search_history_url())
            .json(&NewHistoryEntry { keyword })
            .send()
            .await?;
        ensure_success(response, "search-history")?;
        Ok(())
    }

    #[instrument(name = "Delete search history entry", skip(self), level = "debug")]
    async fn delete(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoints.search_history_entry_url(id))
            .send()
            .await?;
        ensure_success(response, "search-history")?;
        Ok(())
    }
}

#[async_trait]
impl AnimalInfoService for SencityBackend {
    #[instrument(name = "Fetch animal info", skip(self), level = "debug")]
    async fn animal_info(&self, name: &str) -> Result<AnimalInfoPayload> {
        let response = self
            .client
            .get(self.endpoints.animal_info_url())
            .query(&[("name", name)])
            .send()
            .await?;
        Ok(ensure_success(response, "animal-info")?.json().await?)
    }
}

/// Client for the Google Places text search endpoint.
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl GooglePlacesClient {
    pub fn new(endpoints: ServiceEndpoints) -> Result<Self> {
        if endpoints.places_api_key.is_empty() {
            warn!("Place search API key is empty, requests will be denied upstream");
        }
        Ok(Self {
            client: build_client(&endpoints)?,
            endpoints,
        })
    }
}

#[async_trait]
impl PlaceSearchService for GooglePlacesClient {
    #[instrument(name = "Place text search", skip(self), level = "debug")]
    async fn text_search(&self, query: &str) -> Result<TextSearchResponse> {
        let response = self
            .client
            .get(&self.endpoints.places_url)
            .query(&[
                ("query", query),
                ("language", self.endpoints.language.as_str()),
                ("key", self.endpoints.places_api_key.as_str()),
            ])
            .send()
            .await?;

        // Error statuses still carry a JSON body with `status` and `error_message`.
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<TextSearchResponse>(&body) {
            Ok(parsed) => {
                debug!(status = ?parsed.status, results = parsed.results.len(), "Place search answered");
                Ok(parsed)
            }
            Err(_) if !status.is_success() => Err(ServiceError::Status {
                endpoint: "place-textsearch",
                status: status.as_u16(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
