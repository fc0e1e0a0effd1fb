//! Durable player preferences.
//!
//! Volume, the pre-mute snapshot, and the loop toggle outlive the session
//! and the queue. Defaults mirror the playlist store so a fresh profile
//! behaves identically no matter which side reads first.

use std::sync::Arc;

use bridge_traits::storage::{keys, SettingsStore};
use core_playlist::{DEFAULT_PREVIOUS_VOLUME, DEFAULT_VOLUME};

use crate::error::{PlaybackError, Result};

/// Durable preference accessors for the playback controller.
#[derive(Clone)]
pub struct PlayerPrefs {
    settings: Arc<dyn SettingsStore>,
}

impl PlayerPrefs {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub async fn volume(&self) -> Result<f64> {
        Ok(self
            .settings
            .get_f64(keys::VOLUME)
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))?
            .unwrap_or(DEFAULT_VOLUME))
    }

    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.settings
            .set_f64(keys::VOLUME, volume.clamp(0.0, 1.0))
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))
    }

    /// The level to restore on unmute.
    pub async fn previous_volume(&self) -> Result<f64> {
        Ok(self
            .settings
            .get_f64(keys::PREVIOUS_VOLUME)
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))?
            .unwrap_or(DEFAULT_PREVIOUS_VOLUME))
    }

    pub async fn set_previous_volume(&self, volume: f64) -> Result<()> {
        self.settings
            .set_f64(keys::PREVIOUS_VOLUME, volume.clamp(0.0, 1.0))
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))
    }

    pub async fn loop_enabled(&self) -> Result<bool> {
        Ok(self
            .settings
            .get_bool(keys::LOOP_PLAYBACK)
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))?
            .unwrap_or(false))
    }

    pub async fn set_loop_enabled(&self, enabled: bool) -> Result<()> {
        self.settings
            .set_bool(keys::LOOP_PLAYBACK, enabled)
            .await
            .map_err(|e| PlaybackError::Prefs(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::SqliteSettingsStore;

    #[tokio::test]
    async fn defaults_match_the_playlist_store() {
        let prefs = PlayerPrefs::new(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()));
        assert_eq!(prefs.volume().await.unwrap(), DEFAULT_VOLUME);
        assert_eq!(prefs.previous_volume().await.unwrap(), DEFAULT_PREVIOUS_VOLUME);
        assert!(!prefs.loop_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn set_volume_clamps() {
        let prefs = PlayerPrefs::new(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()));
        prefs.set_volume(2.5).await.unwrap();
        assert_eq!(prefs.volume().await.unwrap(), 1.0);
    }
}
