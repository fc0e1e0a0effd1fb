//! # Playlist Store
//!
//! The shared playback queue: an ordered entry list plus the current-playback
//! pointer in session-scoped storage, and volume preferences in durable
//! storage.
//!
//! ## Single-writer requirement
//!
//! Every operation here is a read-modify-write against storage that has no
//! native transactions. Two concurrent mutations would silently lose one of
//! them, so the store is owned by the broker and all writes are funneled
//! through its single command loop. The store itself is deliberately not
//! `Clone`: there is exactly one writer by construction. Read-only access
//! from other contexts goes through the broker's query commands.

use std::sync::Arc;

use bridge_traits::storage::{keys, SessionStore, SettingsStore};
use bridge_traits::surface::SurfaceId;
use tracing::{debug, warn};

use crate::error::{PlaylistError, Result};
use crate::models::{EntryId, VideoEntry};

/// Volume applied when the durable store has no saved value yet.
pub const DEFAULT_VOLUME: f64 = 1.0;
/// Pre-mute volume restored when no snapshot was ever taken.
pub const DEFAULT_PREVIOUS_VOLUME: f64 = 0.5;

/// Ordered playback queue over session-scoped storage.
pub struct PlaylistStore {
    session: Arc<dyn SessionStore>,
    settings: Arc<dyn SettingsStore>,
    max_len: usize,
}

impl PlaylistStore {
    /// Create a store over the given storage areas.
    ///
    /// `max_len` caps the queue; appends past the cap fail with
    /// [`PlaylistError::QueueFull`].
    pub fn new(
        session: Arc<dyn SessionStore>,
        settings: Arc<dyn SettingsStore>,
        max_len: usize,
    ) -> Self {
        Self {
            session,
            settings,
            max_len,
        }
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Snapshot of the queue in playback order. The snapshot is stale the
    /// moment it is returned; callers must not assume it stays fresh.
    pub async fn list(&self) -> Result<Vec<VideoEntry>> {
        self.read_entries().await
    }

    /// Append an entry unless an equal one (same `url` or same
    /// `manifest_url`) already exists.
    ///
    /// Returns `false` without touching storage when the entry is a
    /// duplicate.
    pub async fn append(&self, entry: VideoEntry) -> Result<bool> {
        let mut entries = self.read_entries().await?;

        if entries.iter().any(|e| e.duplicates(&entry)) {
            debug!(url = %entry.url, "entry already queued");
            return Ok(false);
        }
        if entries.len() >= self.max_len {
            return Err(PlaylistError::QueueFull(self.max_len));
        }

        debug!(id = %entry.id, title = %entry.title, "appending entry");
        entries.push(entry);
        self.write_entries(&entries).await?;
        Ok(true)
    }

    /// Insert an entry at position 0 and force the current index to 0.
    ///
    /// "Play immediately" semantics: the entry jumps the queue rather than
    /// merely enqueueing. Same dedup rule as [`append`](Self::append); a
    /// duplicate leaves both the queue and the index untouched.
    pub async fn prepend_and_select(&self, entry: VideoEntry) -> Result<bool> {
        let mut entries = self.read_entries().await?;

        if entries.iter().any(|e| e.duplicates(&entry)) {
            debug!(url = %entry.url, "entry already queued, not prepending");
            return Ok(false);
        }
        if entries.len() >= self.max_len {
            return Err(PlaylistError::QueueFull(self.max_len));
        }

        debug!(id = %entry.id, title = %entry.title, "prepending entry");
        entries.insert(0, entry);
        self.write_entries(&entries).await?;
        self.set_index(0).await?;
        Ok(true)
    }

    /// Remove the entry with the given id, returning the remaining entries.
    ///
    /// Removing an absent id is a no-op that still succeeds. This does NOT
    /// fix up the current index; the caller applies the re-clamp rule
    /// (last-removed clamps to `len - 1`, otherwise the index stays and now
    /// names the entry that shifted into place).
    pub async fn remove_by_id(&self, id: EntryId) -> Result<Vec<VideoEntry>> {
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() != before {
            debug!(%id, remaining = entries.len(), "removed entry");
            self.write_entries(&entries).await?;
        }
        Ok(entries)
    }

    /// Empty the queue and reset the current index. Volume preferences are
    /// durable and survive this.
    pub async fn clear(&self) -> Result<()> {
        self.session.remove(keys::QUEUE).await?;
        self.session.remove(keys::CURRENT_INDEX).await?;
        debug!("cleared queue");
        Ok(())
    }

    /// Number of queued entries.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.read_entries().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    // ------------------------------------------------------------------
    // Current index
    // ------------------------------------------------------------------

    /// Current playback index. Defaults to 0 when never set; meaningless
    /// while the queue is empty.
    pub async fn index(&self) -> Result<usize> {
        let raw = self.session.get(keys::CURRENT_INDEX).await?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or(0))
    }

    /// Set the current playback index. No bounds enforcement here; callers
    /// clamp before calling.
    pub async fn set_index(&self, index: usize) -> Result<()> {
        self.session
            .set(keys::CURRENT_INDEX, &index.to_string())
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Surface reference (session-scoped)
    // ------------------------------------------------------------------

    /// Identifier of the registered player surface from earlier in this
    /// session, if any. Liveness is the caller's problem: the stored
    /// reference may point at a surface that has since closed.
    pub async fn surface_id(&self) -> Result<Option<SurfaceId>> {
        let raw = self.session.get(keys::SURFACE_ID).await?;
        Ok(raw.as_deref().and_then(SurfaceId::parse))
    }

    pub async fn set_surface_id(&self, id: SurfaceId) -> Result<()> {
        self.session.set(keys::SURFACE_ID, &id.to_string()).await?;
        Ok(())
    }

    pub async fn clear_surface_id(&self) -> Result<()> {
        self.session.remove(keys::SURFACE_ID).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Volume preferences (durable, survive clear())
    // ------------------------------------------------------------------

    /// Last applied volume, `0.0..=1.0`.
    pub async fn volume(&self) -> Result<f64> {
        Ok(self
            .settings
            .get_f64(keys::VOLUME)
            .await?
            .unwrap_or(DEFAULT_VOLUME))
    }

    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.settings
            .set_f64(keys::VOLUME, volume.clamp(0.0, 1.0))
            .await?;
        Ok(())
    }

    /// Volume snapshot taken on mute, restored exactly on unmute.
    pub async fn previous_volume(&self) -> Result<f64> {
        Ok(self
            .settings
            .get_f64(keys::PREVIOUS_VOLUME)
            .await?
            .unwrap_or(DEFAULT_PREVIOUS_VOLUME))
    }

    pub async fn set_previous_volume(&self, volume: f64) -> Result<()> {
        self.settings
            .set_f64(keys::PREVIOUS_VOLUME, volume.clamp(0.0, 1.0))
            .await?;
        Ok(())
    }

    /// Durable loop toggle: wrap past the last entry when enabled.
    pub async fn loop_enabled(&self) -> Result<bool> {
        Ok(self
            .settings
            .get_bool(keys::LOOP_PLAYBACK)
            .await?
            .unwrap_or(false))
    }

    pub async fn set_loop_enabled(&self, enabled: bool) -> Result<()> {
        self.settings.set_bool(keys::LOOP_PLAYBACK, enabled).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshot codec
    // ------------------------------------------------------------------

    async fn read_entries(&self) -> Result<Vec<VideoEntry>> {
        let raw = self.session.get(keys::QUEUE).await?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Session-scoped data: a corrupt snapshot is not worth
                // bricking the queue over. Start over empty.
                warn!(error = %e, "discarding corrupt queue snapshot");
                Ok(Vec::new())
            }
        }
    }

    async fn write_entries(&self, entries: &[VideoEntry]) -> Result<()> {
        let raw =
            serde_json::to_string(entries).map_err(|e| PlaylistError::Encode(e.to_string()))?;
        self.session.set(keys::QUEUE, &raw).await?;
        Ok(())
    }
}

/// Re-clamp rule applied after removing the entry at `removed_index` from a
/// queue that now has `remaining_len` entries while `current` was the
/// playback index.
///
/// Pure so every caller (broker, controller) applies the identical rule.
pub fn reclamp_index(current: usize, removed_index: usize, remaining_len: usize) -> usize {
    if remaining_len == 0 {
        return 0;
    }
    if removed_index < current {
        // Everything after the removal shifted left by one.
        return current - 1;
    }
    // Removing at or after the current index: the same numeric index now
    // names the next entry, unless that would overflow.
    current.min(remaining_len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reclamp_keeps_index_when_next_entry_shifts_in() {
        // queue [A,B,C], current=1, remove B (index 1) -> [A,C], current
        // still 1 and now names C.
        assert_eq!(reclamp_index(1, 1, 2), 1);
    }

    #[test]
    fn reclamp_clamps_when_last_was_removed() {
        // queue [A,B,C], current=2, remove C -> [A,B], clamp to 1.
        assert_eq!(reclamp_index(2, 2, 2), 1);
    }

    #[test]
    fn reclamp_shifts_when_earlier_entry_removed() {
        // queue [A,B,C], current=2, remove A -> [B,C], current entry is
        // still C, now at index 1.
        assert_eq!(reclamp_index(2, 0, 2), 1);
    }

    #[test]
    fn reclamp_empty_queue_resets_to_zero() {
        assert_eq!(reclamp_index(0, 0, 0), 0);
    }
}
