//! Storage Abstractions
//!
//! Provides host-agnostic traits for the two persistence areas the queue
//! relies on: a session-scoped key-value area and a durable key-value
//! settings area.

use async_trait::async_trait;

use crate::error::Result;

/// Session-scoped key-value storage trait
///
/// Holds state that is meaningful only for the current browsing session:
/// the queue itself, the current playback index, and the registered player
/// surface identifier. Implementations discard all keys when the session
/// ends; callers must not assume anything survives a restart.
///
/// Values are opaque strings. Callers serialize structured data (JSON) before
/// storing it.
///
/// # Concurrency
///
/// Implementations only need to make individual calls atomic. Read-modify-
/// write sequences are NOT atomic at this level; the broker serializes all
/// mutating sequences through its single command loop.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SessionStore;
///
/// async fn remember_index(store: &dyn SessionStore, index: usize) -> Result<()> {
///     store.set("current_index", &index.to_string()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Retrieve a value, or `None` if the key has never been set this session.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous value for the key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check whether a key is present without retrieving it.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Drop every key in the session area.
    async fn clear(&self) -> Result<()>;
}

/// Durable key-value settings storage trait
///
/// Holds preferences that survive the session: volume, pre-mute volume,
/// loop/autoplay toggles. Implementations back this with whatever the host
/// provides (SQLite on desktop, preferences API elsewhere).
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_volume(store: &dyn SettingsStore, volume: f64) -> Result<()> {
///     store.set_f64("player_volume", volume).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store a floating-point value
    async fn set_f64(&self, key: &str, value: f64) -> Result<()>;

    /// Retrieve a floating-point value
    async fn get_f64(&self, key: &str) -> Result<Option<f64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Session {}

        #[async_trait]
        impl SessionStore for Session {
            async fn get(&self, key: &str) -> Result<Option<String>>;
            async fn set(&self, key: &str, value: &str) -> Result<()>;
            async fn remove(&self, key: &str) -> Result<()>;
            async fn clear(&self) -> Result<()>;
        }
    }

    #[tokio::test]
    async fn contains_is_defined_in_terms_of_get() {
        let mut store = MockSession::new();
        store
            .expect_get()
            .returning(|key| Ok((key == keys::QUEUE).then(|| "[]".to_string())));

        assert!(store.contains(keys::QUEUE).await.unwrap());
        assert!(!store.contains("missing").await.unwrap());
    }
}

/// Well-known storage keys shared between the queue store and its callers.
pub mod keys {
    /// Session key: JSON-encoded ordered queue of entries.
    pub const QUEUE: &str = "queue";
    /// Session key: current playback index (decimal integer).
    pub const CURRENT_INDEX: &str = "current_index";
    /// Session key: registered player surface identifier.
    pub const SURFACE_ID: &str = "surface_id";
    /// Durable key: last applied volume, `0.0..=1.0`.
    pub const VOLUME: &str = "player_volume";
    /// Durable key: volume snapshot taken on mute, `0.0..=1.0`.
    pub const PREVIOUS_VOLUME: &str = "player_previous_volume";
    /// Durable key: wrap to the first entry after the last one finishes.
    pub const LOOP_PLAYBACK: &str = "loop_playback";
}
