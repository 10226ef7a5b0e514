use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::debug;

use super::{CacheKey, Tag};
use crate::api::ApiError;

/// Buffered notifications per key before slow subscribers start lagging.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Lifecycle notifications for a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading,
    Ready,
    Invalidated,
    Failed(String),
}

struct Entry {
    data: Option<CachedData<Value>>,
    tags: Vec<Tag>,
    stale: bool,
    error: Option<String>,
    /// Bumped each time a fetch for this key completes.
    generation: u64,
    /// Bumped each time a mutation invalidates this key.
    invalidations: u64,
}

impl Entry {
    fn new(tags: Vec<Tag>) -> Self {
        Self {
            data: None,
            tags,
            stale: false,
            error: None,
            generation: 0,
            invalidations: 0,
        }
    }

    fn fresh_value(&self) -> Option<&Value> {
        if self.stale {
            return None;
        }
        self.data.as_ref().map(|cached| &cached.data)
    }
}

/// Query-keyed response cache with tag invalidation.
///
/// Concurrent reads of the same key share one in-flight fetch. Failures are
/// attached to the key and are never retried; the next read after a
/// failure issues a new request.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    inflight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
    channels: Mutex<HashMap<CacheKey, broadcast::Sender<QueryState>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fetcher` and store its result.
    pub async fn fetch<F, Fut>(&self, key: CacheKey, tags: Vec<Tag>, fetcher: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Value, ApiError>> + Send,
    {
        let observed = {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) => {
                    if let Some(value) = entry.fresh_value() {
                        debug!(key = %key, "Cache hit");
                        return Ok(value.clone());
                    }
                    entry.generation
                }
                None => 0,
            }
        };

        let lock = self.inflight_lock(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.fetch_locked(&key, tags, observed, fetcher).await
        };
        self.release_inflight(&key, lock).await;

        result
    }

    async fn inflight_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop the key's lock from the map once no other caller holds it.
    async fn release_inflight(&self, key: &CacheKey, lock: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        let unused = inflight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &lock) && Arc::strong_count(&lock) == 2);
        if unused {
            inflight.remove(key);
        }
    }

    async fn fetch_locked<F, Fut>(&self, key: &CacheKey, tags: Vec<Tag>, observed: u64, fetcher: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Value, ApiError>> + Send,
    {
        // Register the tags before fetching so a mutation that lands while
        // the request is in flight can mark this entry.
        let epoch = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(Vec::new()));
            if let Some(value) = entry.fresh_value() {
                debug!(key = %key, "Served by concurrent request");
                return Ok(value.clone());
            }
            if entry.generation != observed {
                if let Some(ref message) = entry.error {
                    return Err(ApiError::Query(message.clone()));
                }
            }
            entry.tags = tags;
            entry.invalidations
        };

        debug!(key = %key, "Cache miss, fetching");
        self.notify(key, QueryState::Loading).await;
        let result = fetcher().await;

        let state = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(Vec::new()));
            entry.generation += 1;
            let invalidated_in_flight = entry.invalidations != epoch;
            match result {
                Ok(ref value) => {
                    entry.data = Some(CachedData::new(value.clone()));
                    entry.stale = invalidated_in_flight;
                    entry.error = None;
                    if invalidated_in_flight {
                        debug!(key = %key, "Invalidated while in flight, stored as stale");
                    }
                    QueryState::Ready
                }
                Err(ref e) => {
                    entry.error = Some(e.to_string());
                    QueryState::Failed(e.to_string())
                }
            }
        };
        self.notify(key, state).await;

        result
    }

    /// Mark every entry providing one of `tags` as stale. Returns how many were marked.
    pub async fn invalidate(&self, tags: &[Tag]) -> usize {
        let invalidated: Vec<CacheKey> = {
            let mut entries = self.entries.write().await;
            entries
                .iter_mut()
                .filter(|(_, entry)| {
                    entry
                        .tags
                        .iter()
                        .any(|provided| tags.iter().any(|tag| tag.invalidates(provided)))
                })
                .map(|(key, entry)| {
                    entry.stale = true;
                    entry.invalidations += 1;
                    key.clone()
                })
                .collect()
        };

        debug!(
            tags = %tags.iter().map(Tag::to_string).collect::<Vec<_>>().join(","),
            count = invalidated.len(),
            "Invalidated cache entries"
        );

        for key in &invalidated {
            self.notify(key, QueryState::Invalidated).await;
        }
        invalidated.len()
    }

    /// Subscribe to state changes of one key.
    pub async fn subscribe(&self, key: &CacheKey) -> broadcast::Receiver<QueryState> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(SUBSCRIBER_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    async fn notify(&self, key: &CacheKey, state: QueryState) {
        let mut channels = self.channels.lock().await;
        let abandoned = channels
            .get(key)
            .is_some_and(|tx| tx.send(state).is_err());
        if abandoned {
            // Every receiver has been dropped
            channels.remove(key);
        }
    }

    /// Last stored value for `key`, even if stale.
    pub async fn peek(&self, key: &CacheKey) -> Option<CachedData<Value>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// True when the key has no value or has been invalidated.
    pub async fn is_stale(&self, key: &CacheKey) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|entry| entry.fresh_value().is_none())
            .unwrap_or(true)
    }

    /// Error message of the most recent failed fetch, cleared on success.
    pub async fn last_error(&self, key: &CacheKey) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| entry.error.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.inflight.lock().await.clear();
        self.channels.lock().await.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
