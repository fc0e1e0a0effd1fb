//! # Runtime Settings
//!
//! Tunables shared across the broker and the playback controller, with the
//! defaults the system ships with. Durable user toggles (volume, loop) live
//! in the settings store; this struct only seeds them and carries the
//! non-persisted knobs (timer durations, queue cap, channel sizes).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings for the queue core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Start playing automatically once the surface loads a queue entry.
    pub autoplay: bool,

    /// Default for the durable loop toggle when the settings store has no
    /// stored value yet.
    pub loop_playback_default: bool,

    /// Maximum number of entries the queue will hold.
    pub max_queue_len: usize,

    /// Delay before auto-advancing past an entry that failed fatally.
    #[serde(with = "duration_millis")]
    pub advance_delay: Duration,

    /// How long a transient user-visible notice stays up.
    #[serde(with = "duration_millis")]
    pub notice_duration: Duration,

    /// Idle time before on-screen controls hide.
    #[serde(with = "duration_millis")]
    pub controls_idle_hide: Duration,

    /// Buffer size for the event bus.
    pub event_buffer: usize,

    /// Buffer size for the broker command channel.
    pub command_buffer: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            loop_playback_default: false,
            max_queue_len: 50,
            advance_delay: Duration::from_millis(3000),
            notice_duration: Duration::from_millis(4000),
            controls_idle_hide: Duration::from_millis(2500),
            event_buffer: 100,
            command_buffer: 64,
        }
    }
}

impl RuntimeSettings {
    /// Validate invariants the rest of the system assumes.
    pub fn validate(&self) -> Result<()> {
        if self.max_queue_len == 0 {
            return Err(Error::Config("max_queue_len must be at least 1".into()));
        }
        if self.event_buffer == 0 || self.command_buffer == 0 {
            return Err(Error::Config("channel buffers must be non-zero".into()));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
