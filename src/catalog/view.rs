//! Catalog view: the item list derived from the current filter criteria
//!
//! Every fetch is stamped with a monotonically increasing generation. Only the
//! result of the latest issued fetch is applied, so a slow query for old
//! criteria can never overwrite a newer list.

use super::filter::{FilterCriteria, QueryKey};
use super::models::CatalogItem;
use crate::error::{Result, ToolError};
use crate::ports::CatalogPort;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// A fetch that has been issued but not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    key: QueryKey,
}

impl FetchTicket {
    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a resolved fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "count", rename_all = "camelCase")]
pub enum FetchOutcome {
    /// The criteria did not change, nothing was requested
    Unchanged,
    /// The result replaced the item list; carries the new item count
    Applied(usize),
    /// A newer fetch was issued meanwhile; the result was dropped
    Stale,
}

#[derive(Default)]
struct ViewInner {
    items: Vec<CatalogItem>,
    generation: u64,
    requested: Option<QueryKey>,
    applied: Option<QueryKey>,
}

/// Rolls `requested` back to the shown key if a fetch is dropped before it
/// resolves, so the same criteria can be requested again
struct PendingFetch<'a> {
    inner: &'a Mutex<ViewInner>,
    generation: u64,
    settled: bool,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.generation == self.generation {
            debug!(generation = self.generation, "Catalog fetch abandoned");
            inner.requested = inner.applied.clone();
        }
    }
}

impl ViewInner {
    fn issue(&mut self, key: QueryKey) -> FetchTicket {
        self.generation += 1;
        self.requested = Some(key.clone());
        FetchTicket {
            generation: self.generation,
            key,
        }
    }
}

/// Holds the most recently fetched items for the current criteria
pub struct CatalogView {
    port: Arc<dyn CatalogPort>,
    inner: Mutex<ViewInner>,
}

impl CatalogView {
    pub fn new(port: Arc<dyn CatalogPort>) -> Self {
        Self {
            port,
            inner: Mutex::new(ViewInner::default()),
        }
    }

    /// Most recently applied item list, in port order
    pub fn current_items(&self) -> Vec<CatalogItem> {
        self.inner.lock().items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Looks an item up in the current list
    pub fn find(&self, item_id: &str) -> Option<CatalogItem> {
        self.inner
            .lock()
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
    }

    /// Key of the list currently shown, `None` before the first success
    #[cfg(test)]
    fn applied_key(&self) -> Option<QueryKey> {
        self.inner.lock().applied.clone()
    }

    /// Issues a fetch when `criteria` maps to a different key than the last
    /// one requested.
    pub fn track(&self, criteria: &FilterCriteria) -> Option<FetchTicket> {
        let key = criteria.query_key();
        let mut inner = self.inner.lock();
        if inner.requested.as_ref() == Some(&key) {
            debug!(?key, "Criteria unchanged, no fetch");
            return None;
        }
        Some(inner.issue(key))
    }

    /// Issues a fetch for `criteria` even if that key was already requested
    pub fn invalidate(&self, criteria: &FilterCriteria) -> FetchTicket {
        self.inner.lock().issue(criteria.query_key())
    }

    /// Calls the catalog port for `ticket` and applies the result if the
    /// ticket is still the latest one. Failures keep the previous list.
    pub async fn run(&self, ticket: FetchTicket) -> Result<FetchOutcome> {
        let key = &ticket.key;
        let mut pending = PendingFetch {
            inner: &self.inner,
            generation: ticket.generation,
            settled: false,
        };
        let result = self
            .port
            .query_items(&key.family, &key.item_type, &key.search_text)
            .await;
        pending.settled = true;

        let mut inner = self.inner.lock();
        if inner.generation != ticket.generation {
            debug!(
                generation = ticket.generation,
                latest = inner.generation,
                "Discarding stale catalog result"
            );
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(items) => {
                let count = items.len();
                inner.items = items;
                inner.applied = Some(key.clone());
                debug!(count, generation = ticket.generation, "Catalog view updated");
                Ok(FetchOutcome::Applied(count))
            }
            Err(e) => {
                warn!(error = %e, ?key, "Catalog query failed, keeping previous items");
                Err(ToolError::fetch("items", e))
            }
        }
    }
}
