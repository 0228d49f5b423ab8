//! Read-through cache of the remote search history.
//!
//! The remote service is authoritative and may hold duplicate keywords. Every view handed
//! out by [`HistoryStore`] goes through [`deduplicate`], and every mutation is followed by a
//! full re-fetch instead of a local merge.
use std::cell::{Cell, RefCell};
use std::sync::Arc;

use itertools::Itertools;
use sencity_services::{HistoryRecord, HistoryService};
use tracing::{debug, info, instrument, warn};

use crate::sequence::SequenceGate;

/// One previously submitted search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistoryEntry {
    /// Server-assigned id.
    pub id: i64,
    pub keyword: String,
}

impl From<HistoryRecord> for SearchHistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            keyword: record.keyword,
        }
    }
}

/// Whether the cached history may still change because a refresh is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// At least one refresh is in flight; the cached list may be stale.
    Pending,
    /// No refresh is in flight.
    Settled,
}

/// Keeps the first entry of every trimmed keyword, preserving order.
pub fn deduplicate<I>(entries: I) -> Vec<SearchHistoryEntry>
where
    I: IntoIterator<Item = SearchHistoryEntry>,
{
    entries
        .into_iter()
        .unique_by(|entry| entry.keyword.trim().to_owned())
        .collect()
}

struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Client-side view of the history service.
///
/// Failures never propagate: a failed fetch leaves an empty list, a failed create or delete
/// leaves the list as it was.
pub struct HistoryStore {
    service: Arc<dyn HistoryService>,
    entries: RefCell<Vec<SearchHistoryEntry>>,
    selected: Cell<Option<i64>>,
    in_flight: Cell<usize>,
    refreshes: SequenceGate,
}

impl HistoryStore {
    pub fn new(service: Arc<dyn HistoryService>) -> Self {
        Self {
            service,
            entries: RefCell::new(Vec::new()),
            selected: Cell::new(None),
            in_flight: Cell::new(0),
            refreshes: SequenceGate::default(),
        }
    }

    /// Deduplicated cached history.
    pub fn list(&self) -> Vec<SearchHistoryEntry> {
        self.entries.borrow().clone()
    }

    pub fn freshness(&self) -> Freshness {
        if self.in_flight.get() == 0 {
            Freshness::Settled
        } else {
            Freshness::Pending
        }
    }

    /// Exact, case-sensitive lookup of a trimmed keyword in the deduplicated view.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        self.entries
            .borrow()
            .iter()
            .any(|entry| entry.keyword.trim() == keyword)
    }

    pub fn find(&self, id: i64) -> Option<SearchHistoryEntry> {
        self.entries.borrow().iter().find(|e| e.id == id).cloned()
    }

    /// Re-fetches the whole history. A result older than one already applied is dropped.
    #[instrument(name = "Refresh search history", skip(self), level = "debug")]
    pub async fn refresh(&self) {
        let _in_flight = InFlight::enter(&self.in_flight);
        let ticket = self.refreshes.issue();

        let fetched = self.service.list().await;
        if !self.refreshes.try_apply(ticket) {
            debug!("Discarding stale history refresh");
            return;
        }
        match fetched {
            Ok(records) => {
                let entries = deduplicate(records.into_iter().map(SearchHistoryEntry::from));
                debug!(count = entries.len(), "History refreshed");
                self.entries.replace(entries);
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch search history, clearing local list");
                self.entries.replace(Vec::new());
            }
        }
    }

    /// Creates `keyword` remotely and refreshes. Returns whether the create succeeded.
    #[instrument(name = "Add search history entry", skip(self), level = "debug")]
    pub async fn add(&self, keyword: &str) -> bool {
        let _in_flight = InFlight::enter(&self.in_flight);
        if let Err(e) = self.service.create(keyword).await {
            warn!(error = %e, keyword, "Failed to store search keyword");
            return false;
        }
        info!(keyword, "Stored search keyword");
        self.refresh().await;
        true
    }

    /// Deletes `id` remotely, clears the selection if it pointed at `id`, and refreshes.
    /// Returns whether the delete succeeded. A 404 means the row is already gone and counts
    /// as success.
    #[instrument(name = "Remove search history entry", skip(self), level = "debug")]
    pub async fn remove(&self, id: i64) -> bool {
        let _in_flight = InFlight::enter(&self.in_flight);
        match self.service.delete(id).await {
            Ok(()) => {}
            Err(e) if e.status() == Some(404) => {
                debug!(id, "Search history entry already removed upstream");
            }
            Err(e) => {
                warn!(error = %e, id, "Failed to delete search history entry");
                return false;
            }
        }
        if self.selected.get() == Some(id) {
            self.selected.set(None);
        }
        self.refresh().await;
        true
    }

    /// Marks the row `id` as selected. Returns the entry, or `None` if it is not listed.
    pub fn select(&self, id: i64) -> Option<SearchHistoryEntry> {
        let entry = self.find(id)?;
        self.selected.set(Some(id));
        Some(entry)
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected.get()
    }

    pub fn clear_selection(&self) {
        self.selected.set(None);
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries.borrow().len())
            .field("selected", &self.selected.get())
            .field("freshness", &self.freshness())
            .finish_non_exhaustive()
    }
}
