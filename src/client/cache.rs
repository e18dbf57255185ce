use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Identifies one cached collection: a resource kind of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub project_id: Uuid,
    pub resource: &'static str,
}

impl CacheKey {
    pub fn new(project_id: Uuid, resource: &'static str) -> Self {
        Self {
            project_id,
            resource,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/{}", self.project_id, self.resource)
    }
}

/// Write token handed out by [`QueryCache::begin`]. A later `begin` on the
/// same key supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    /// A fetched or optimistic value was written.
    Updated,
    /// The value is stale and should be refetched.
    Invalidated,
    /// A failed mutation restored the previous value.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: CacheKey,
    pub kind: CacheEventKind,
}

#[derive(Debug)]
struct Entry<V> {
    value: Option<V>,
    stale: bool,
    generation: u64,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            stale: true,
            generation: 0,
        }
    }
}

/// Keyed in-memory cache of fetched collections with change notifications.
///
/// Every entry carries a generation counter. Starting a fetch or an
/// optimistic mutation bumps it and returns a [`Generation`]; results are
/// only applied while that generation is still current. This is what keeps
/// a slow response from an older request from overwriting a newer
/// optimistic value.
///
/// # Examples
///
/// ```rust
/// use makeaplan::client::{CacheKey, QueryCache};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let cache = QueryCache::<Vec<u32>>::new();
/// let key = CacheKey::new(Uuid::new_v4(), "tasks");
///
/// let fetch = cache.begin(&key).await;
/// let (_, optimistic) = cache.apply(&key, |_| Some(vec![1])).await;
///
/// // the fetch started before the optimistic write and is discarded
/// assert!(!cache.resolve(&key, fetch, vec![]).await);
/// assert_eq!(cache.get(&key).await, Some(vec![1]));
/// # let _ = optimistic;
/// # }
/// ```
pub struct QueryCache<V> {
    entries: Arc<RwLock<HashMap<CacheKey, Entry<V>>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            events: self.events.clone(),
        }
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self::with_events(events)
    }

    /// Share one change feed between several caches, so a page can listen
    /// to all of its collections through a single receiver.
    pub fn with_events(events: broadcast::Sender<CacheEvent>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| entry.value.clone())
    }

    /// True when the key has never been fetched or was invalidated.
    pub async fn is_stale(&self, key: &CacheKey) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.stale).unwrap_or(true)
    }

    /// Start a request for `key`, superseding every earlier one.
    pub async fn begin(&self, key: &CacheKey) -> Generation {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(*key).or_default();
        entry.generation += 1;
        Generation(entry.generation)
    }

    pub async fn is_current(&self, key: &CacheKey, generation: Generation) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|entry| entry.generation == generation.0)
            .unwrap_or(false)
    }

    /// Snapshot the current value and write the one computed by `predict`,
    /// as a single step. Returns the snapshot and the generation of this
    /// optimistic write.
    pub async fn apply<F>(&self, key: &CacheKey, predict: F) -> (Option<V>, Generation)
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let written = {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(*key).or_default();
            let snapshot = entry.value.clone();
            if let Some(predicted) = predict(snapshot.as_ref()) {
                entry.value = Some(predicted);
            }
            entry.generation += 1;
            (snapshot, Generation(entry.generation))
        };
        self.publish(*key, CacheEventKind::Updated);
        written
    }

    /// Store a server result if `generation` is still current. Returns
    /// whether it was applied.
    pub async fn resolve(&self, key: &CacheKey, generation: Generation, value: V) -> bool {
        let applied = {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(*key).or_default();
            if entry.generation == generation.0 {
                entry.value = Some(value);
                entry.stale = false;
                true
            } else {
                false
            }
        };
        if applied {
            self.publish(*key, CacheEventKind::Updated);
        }
        applied
    }

    /// Undo an optimistic write. If something newer was written since, the
    /// snapshot is out of date too, so the key is only marked stale.
    pub async fn rollback(&self, key: &CacheKey, generation: Generation, snapshot: Option<V>) -> bool {
        let restored = {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(*key).or_default();
            if entry.generation == generation.0 {
                entry.value = snapshot;
                true
            } else {
                entry.stale = true;
                false
            }
        };
        let kind = if restored {
            CacheEventKind::RolledBack
        } else {
            CacheEventKind::Invalidated
        };
        self.publish(*key, kind);
        restored
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        {
            let mut entries = self.entries.write().await;
            entries.entry(*key).or_default().stale = true;
        }
        self.publish(*key, CacheEventKind::Invalidated);
    }

    pub async fn remove(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.write().await;
        entries.remove(key).and_then(|entry| entry.value)
    }

    fn publish(&self, key: CacheKey, kind: CacheEventKind) {
        // no subscribers is fine
        let _ = self.events.send(CacheEvent { key, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheKey {
        CacheKey::new(Uuid::nil(), "tasks")
    }

    #[tokio::test]
    async fn unknown_keys_are_stale_and_empty() {
        let cache = QueryCache::<Vec<u32>>::new();
        assert!(cache.is_stale(&key()).await);
        assert_eq!(cache.get(&key()).await, None);
    }

    #[tokio::test]
    async fn resolve_applies_current_generation() {
        let cache = QueryCache::new();
        let generation = cache.begin(&key()).await;
        assert!(cache.resolve(&key(), generation, vec![1, 2]).await);
        assert_eq!(cache.get(&key()).await, Some(vec![1, 2]));
        assert!(!cache.is_stale(&key()).await);
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let cache = QueryCache::new();
        let fetch = cache.begin(&key()).await;
        let (snapshot, _) = cache.apply(&key(), |_| Some(vec![7])).await;
        assert_eq!(snapshot, None);

        assert!(!cache.resolve(&key(), fetch, vec![]).await);
        assert_eq!(cache.get(&key()).await, Some(vec![7]));
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() {
        let cache = QueryCache::new();
        let generation = cache.begin(&key()).await;
        cache.resolve(&key(), generation, vec![1]).await;

        let (snapshot, optimistic) = cache
            .apply(&key(), |current| {
                let mut next = current.cloned().unwrap_or_default();
                next.push(2);
                Some(next)
            })
            .await;
        assert_eq!(cache.get(&key()).await, Some(vec![1, 2]));

        assert!(cache.rollback(&key(), optimistic, snapshot).await);
        assert_eq!(cache.get(&key()).await, Some(vec![1]));
    }

    #[tokio::test]
    async fn superseded_rollback_marks_stale() {
        let cache = QueryCache::new();
        let generation = cache.begin(&key()).await;
        cache.resolve(&key(), generation, vec![1]).await;

        let (first_snapshot, first) = cache.apply(&key(), |_| Some(vec![1, 2])).await;
        let (_, _second) = cache.apply(&key(), |_| Some(vec![1, 2, 3])).await;

        assert!(!cache.rollback(&key(), first, first_snapshot).await);
        assert_eq!(cache.get(&key()).await, Some(vec![1, 2, 3]));
        assert!(cache.is_stale(&key()).await);
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let cache = QueryCache::new();
        let mut events = cache.subscribe();

        let (snapshot, generation) = cache.apply(&key(), |_| Some(vec![1])).await;
        cache.rollback(&key(), generation, snapshot).await;
        cache.invalidate(&key()).await;

        let kinds: Vec<_> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|event| event.kind)
        .collect();
        assert_eq!(
            kinds,
            vec![
                CacheEventKind::Updated,
                CacheEventKind::RolledBack,
                CacheEventKind::Invalidated
            ]
        );
    }
}
