use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Stable tags for the collections this client caches.
pub mod queries {
    pub const MILESTONES: &str = "milestones";
    pub const FILTERS: &str = "filters";
}

pub type QueryKey = &'static str;

/// What a reader sees for a key. Stale payloads stay readable so screens can
/// keep rendering the old data while a refresh is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Fresh(T),
    Stale(T),
    Missing,
}

impl<T> QueryState<T> {
    /// Whatever payload exists, fresh or not.
    pub fn payload(self) -> Option<T> {
        match self {
            Self::Fresh(value) | Self::Stale(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// Whether a reader observing this state should issue a fetch.
    pub fn needs_fetch(&self) -> bool {
        !matches!(self, Self::Fresh(_))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    payload: serde_json::Value,
    stale: bool,
}

/// Process-wide keyed store for fetched collections.
///
/// The cache itself never fetches. [`QueryCache::invalidate`] only marks an
/// entry stale; whoever reads a stale or missing entry is responsible for
/// fetching and calling [`QueryCache::store`], which clears the mark.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store<T: Serialize>(&self, key: QueryKey, payload: &T) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "payload not storable; dropping");
                return;
            }
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key,
                Entry {
                    payload,
                    stale: false,
                },
            );
    }

    pub fn read<T: DeserializeOwned>(&self, key: QueryKey) -> QueryState<T> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get(key) else {
            return QueryState::Missing;
        };
        match serde_json::from_value(entry.payload.clone()) {
            Ok(value) if entry.stale => QueryState::Stale(value),
            Ok(value) => QueryState::Fresh(value),
            Err(err) => {
                warn!(key, %err, "cached payload unreadable; treating as missing");
                QueryState::Missing
            }
        }
    }

    /// Mark `key` stale. Data stays in place; nothing is fetched here.
    /// Unknown keys are a no-op.
    pub fn invalidate(&self, key: QueryKey) {
        if let Some(entry) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
        {
            entry.stale = true;
        }
    }
}
