//! Media Cache - per-session store of synthesized images and narration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use story_graph::NodeId;

use super::lock;

/// Opaque media bytes, shared between the cache and its readers.
pub type Payload = Arc<[u8]>;

/// The kind of media cached for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "img",
            MediaKind::Audio => "audio",
        }
    }
}

/// Cache key: one slot per node and media kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey {
    pub node: NodeId,
    pub kind: MediaKind,
}

impl MediaKey {
    pub fn image(node: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            kind: MediaKind::Image,
        }
    }

    pub fn audio(node: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            kind: MediaKind::Audio,
        }
    }

    /// The string key used in the backing store, e.g. `img_start`.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.kind.prefix(), self.node)
    }
}

impl std::fmt::Display for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.node)
    }
}

/// Errors writing to a session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Session store is full: {needed} bytes needed, {available} available")]
    CapacityExceeded { needed: usize, available: usize },
}

/// Key/value storage that lives as long as the session.
///
/// Writes may fail once capacity is exhausted; callers treat that as "not
/// cached this time".
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Payload>;
    fn set(&self, key: &str, value: Payload) -> Result<(), StoreError>;
    fn clear(&self);
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    entries: HashMap<String, Payload>,
    used: usize,
}

/// In-process session store with a byte budget covering keys and values.
#[derive(Debug)]
pub struct MemoryStore {
    capacity: usize,
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(MemoryStoreInner::default()),
        }
    }

    /// Bytes currently in use.
    pub fn used(&self) -> usize {
        lock(&self.inner).used
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Payload> {
        lock(&self.inner).entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Payload) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);

        let replaced = inner
            .entries
            .get(key)
            .map_or(0, |old| key.len() + old.len());
        let needed = key.len() + value.len();
        let available = self.capacity - (inner.used - replaced);

        if needed > available {
            return Err(StoreError::CapacityExceeded { needed, available });
        }

        inner.used = inner.used - replaced + needed;
        inner.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.entries.clear();
        inner.used = 0;
    }
}

/// Write-once cache of media payloads keyed by node and kind.
///
/// Every [`clear`](MediaCache::clear) starts a new epoch. Requests remember
/// the epoch they started in and write through
/// [`put_if_current`](MediaCache::put_if_current), so a result that arrives
/// after a restart never repopulates the fresh session.
pub struct MediaCache {
    store: Box<dyn SessionStore>,
    epoch: AtomicU64,
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl MediaCache {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            epoch: AtomicU64::new(0),
        }
    }

    /// In-memory cache with the given byte capacity.
    pub fn in_memory(capacity: usize) -> Self {
        Self::new(MemoryStore::new(capacity))
    }

    pub fn get(&self, key: &MediaKey) -> Option<Payload> {
        let hit = self.store.get(&key.storage_key());
        tracing::debug!(key = %key, hit = hit.is_some(), "Media cache lookup");
        hit
    }

    /// Store a payload. The first value written for a key wins.
    pub fn put(&self, key: &MediaKey, payload: Payload) -> Result<(), StoreError> {
        let storage_key = key.storage_key();
        if self.store.get(&storage_key).is_some() {
            return Ok(());
        }
        self.store.set(&storage_key, payload)
    }

    /// Store a payload unless the cache was cleared since `epoch`.
    ///
    /// Store failures are logged and swallowed. Returns whether the payload
    /// is now cached.
    pub fn put_if_current(&self, epoch: u64, key: &MediaKey, payload: Payload) -> bool {
        if self.epoch() != epoch {
            tracing::debug!(key = %key, "Dropping media from a cleared session");
            return false;
        }

        match self.put(key, payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to cache media");
                false
            }
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Drop every entry and start a new epoch.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.store.clear();
    }
}
