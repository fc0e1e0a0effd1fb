//! In-memory session store.
//!
//! The session area holds only the queue, the current index, and the surface
//! reference, none of which outlive the session — a process-local map is the
//! whole implementation.

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::SessionStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Session-scoped key-value storage backed by a process-local map.
///
/// Dropping the store *is* the end of the session.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        debug!("cleared session storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemorySessionStore::new();

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.contains("k").await.unwrap());

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Removing again is not an error.
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = MemorySessionStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        assert_eq!(store.len(), 2);

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
