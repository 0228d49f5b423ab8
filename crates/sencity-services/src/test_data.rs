//! Scripted in-memory services.
//!
//! These stand in for the remote collaborators in tests and offline development. Each
//! service records the calls it receives and can be told to fail or to answer slowly, which
//! is how response-ordering races are reproduced deterministically (pair them with a paused
//! tokio clock).
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    AnimalInfoPayload, AnimalInfoService, HistoryRecord, HistoryService, PlaceResult,
    PlaceSearchService, Result, ServiceError, TextSearchResponse,
};

/// A failure a scripted service should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    Transport(String),
    Status(u16),
}

impl ScriptedFailure {
    fn into_error(self, endpoint: &'static str) -> ServiceError {
        match self {
            Self::Transport(message) => ServiceError::Transport(message),
            Self::Status(status) => ServiceError::Status { endpoint, status },
        }
    }
}

#[derive(Debug, Clone)]
enum Scripted<T> {
    Respond(T),
    Fail(ScriptedFailure),
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay.filter(|d| !d.is_zero()) {
        tokio::time::sleep(delay).await;
    }
}

/// Calls observed by [`InMemoryHistoryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCall {
    List,
    Create(String),
    Delete(i64),
}

/// History service keeping its rows in memory. Ids are assigned sequentially from 1.
///
/// It does not deduplicate keywords, just like the real backend.
#[derive(Debug, Default)]
pub struct InMemoryHistoryService {
    records: Mutex<Vec<HistoryRecord>>,
    next_id: AtomicI64,
    calls: Mutex<Vec<HistoryCall>>,
    list_delays: Mutex<VecDeque<Duration>>,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
}

impl InMemoryHistoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows as they would be stored server-side, duplicates included.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let service = Self::new();
        for keyword in keywords {
            service.insert_raw(keyword);
        }
        service
    }

    /// Insert a row directly, bypassing the call log.
    pub fn insert_raw(&self, keyword: impl Into<String>) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.records).push(HistoryRecord {
            id,
            keyword: keyword.into(),
        });
        id
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        lock(&self.records).clone()
    }

    pub fn calls(&self) -> Vec<HistoryCall> {
        lock(&self.calls).clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, HistoryCall::Create(_)))
            .count()
    }

    /// Delays for subsequent `list` calls, consumed one per call. The snapshot is taken
    /// before the delay, so a delayed list answers with the rows as they were when it was
    /// issued.
    pub fn queue_list_delays(&self, delays: impl IntoIterator<Item = Duration>) {
        lock(&self.list_delays).extend(delays);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryService for InMemoryHistoryService {
    async fn list(&self) -> Result<Vec<HistoryRecord>> {
        lock(&self.calls).push(HistoryCall::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                endpoint: "search-history",
                status: 500,
            });
        }
        let snapshot = self.records();
        let delay = lock(&self.list_delays).pop_front();
        pause(delay).await;
        Ok(snapshot)
    }

    async fn create(&self, keyword: &str) -> Result<()> {
        lock(&self.calls).push(HistoryCall::Create(keyword.to_string()));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("connection refused".to_string()));
        }
        self.insert_raw(keyword);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        lock(&self.calls).push(HistoryCall::Delete(id));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("connection refused".to_string()));
        }
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(ServiceError::Status {
                endpoint: "search-history",
                status: 404,
            });
        }
        Ok(())
    }
}

/// Animal knowledge service answering from a script keyed by name.
///
/// Unscripted names answer with an empty payload, which is how the backend reports an
/// unknown species.
#[derive(Debug, Default)]
pub struct ScriptedAnimalInfoService {
    script: Mutex<HashMap<String, Scripted<AnimalInfoPayload>>>,
    delays: Mutex<HashMap<String, VecDeque<Duration>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAnimalInfoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, payload: AnimalInfoPayload) -> Self {
        let name = payload.name.clone().unwrap_or_default();
        lock(&self.script).insert(name, Scripted::Respond(payload));
        self
    }

    pub fn with_payload(self, name: impl Into<String>, payload: AnimalInfoPayload) -> Self {
        lock(&self.script).insert(name.into(), Scripted::Respond(payload));
        self
    }

    pub fn with_failure(self, name: impl Into<String>, failure: ScriptedFailure) -> Self {
        lock(&self.script).insert(name.into(), Scripted::Fail(failure));
        self
    }

    /// Delays for subsequent lookups of `name`, consumed one per call.
    pub fn with_delays(
        self,
        name: impl Into<String>,
        delays: impl IntoIterator<Item = Duration>,
    ) -> Self {
        lock(&self.delays)
            .entry(name.into())
            .or_default()
            .extend(delays);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl AnimalInfoService for ScriptedAnimalInfoService {
    async fn animal_info(&self, name: &str) -> Result<AnimalInfoPayload> {
        lock(&self.calls).push(name.to_string());
        let scripted = lock(&self.script).get(name).cloned();
        let delay = lock(&self.delays)
            .get_mut(name)
            .and_then(VecDeque::pop_front);
        pause(delay).await;
        match scripted {
            Some(Scripted::Respond(payload)) => Ok(payload),
            Some(Scripted::Fail(failure)) => Err(failure.into_error("animal-info")),
            None => Ok(AnimalInfoPayload::default()),
        }
    }
}

/// Place search service answering from a script keyed by query.
///
/// Unscripted queries answer with `ZERO_RESULTS`.
#[derive(Debug, Default)]
pub struct ScriptedPlaceSearchService {
    script: Mutex<HashMap<String, Scripted<TextSearchResponse>>>,
    delays: Mutex<HashMap<String, VecDeque<Duration>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedPlaceSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, query: impl Into<String>, response: TextSearchResponse) -> Self {
        lock(&self.script).insert(query.into(), Scripted::Respond(response));
        self
    }

    /// Shorthand for an `OK` response carrying `results`.
    pub fn with_results(self, query: impl Into<String>, results: Vec<PlaceResult>) -> Self {
        self.with_response(query, TextSearchResponse::ok(results))
    }

    pub fn with_failure(self, query: impl Into<String>, failure: ScriptedFailure) -> Self {
        lock(&self.script).insert(query.into(), Scripted::Fail(failure));
        self
    }

    pub fn with_delays(
        self,
        query: impl Into<String>,
        delays: impl IntoIterator<Item = Duration>,
    ) -> Self {
        lock(&self.delays)
            .entry(query.into())
            .or_default()
            .extend(delays);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PlaceSearchService for ScriptedPlaceSearchService {
    async fn text_search(&self, query: &str) -> Result<TextSearchResponse> {
        lock(&self.calls).push(query.to_string());
        let scripted = lock(&self.script).get(query).cloned();
        let delay = lock(&self.delays)
            .get_mut(query)
            .and_then(VecDeque::pop_front);
        pause(delay).await;
        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(failure)) => Err(failure.into_error("place-textsearch")),
            None => Ok(TextSearchResponse::zero_results()),
        }
    }
}

/// A complete animal payload as the backend would return it for `name`.
pub fn animal_payload(name: &str, english: &str) -> AnimalInfoPayload {
    AnimalInfoPayload {
        name: Some(name.to_string()),
        english: Some(english.to_string()),
        image_url: Some(format!("https://images.sencity.test/{english}.jpg")),
        features: Some(vec![format!("{name}의 주요 특징")]),
        precautions: Some(vec![
            "먹이를 주지 마세요".to_string(),
            "거리를 유지하세요".to_string(),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_history_roundtrip() {
        let service = InMemoryHistoryService::with_keywords(["고라니", "고라니"]);
        service.create("서울역").await.unwrap();

        let records = service.list().await.unwrap();
        assert_eq!(records.len(), 3, "duplicates are kept server-side");
        assert_eq!(records[2].id, 3);

        service.delete(1).await.unwrap();
        let keywords: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.keyword)
            .collect();
        assert_eq!(keywords, vec!["고라니", "서울역"]);
        assert_eq!(
            service.calls(),
            vec![
                HistoryCall::Create("서울역".to_string()),
                HistoryCall::List,
                HistoryCall::Delete(1),
                HistoryCall::List,
            ]
        );
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let animals = ScriptedAnimalInfoService::new()
            .with_failure("멧돼지", ScriptedFailure::Status(503));
        let err = animals.animal_info("멧돼지").await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        let unknown = animals.animal_info("용").await.unwrap();
        assert!(unknown.name.is_none());
    }

    #[tokio::test]
    async fn test_deleting_a_missing_row_is_not_found() {
        let service = InMemoryHistoryService::with_keywords(["고라니"]);
        let err = service.delete(7).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(service.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_list_returns_snapshot_from_issue_time() {
        let service = InMemoryHistoryService::with_keywords(["노루"]);
        service.queue_list_delays([Duration::from_millis(100)]);

        let (records, ()) = tokio::join!(service.list(), async {
            service.insert_raw("너구리");
        });
        assert_eq!(records.unwrap().len(), 1);
        assert_eq!(service.records().len(), 2);
    }
}
