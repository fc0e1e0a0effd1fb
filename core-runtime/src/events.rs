//! # Event Bus System
//!
//! Event-driven backbone for the queue core, built on
//! `tokio::sync::broadcast`. Modules publish typed events; any number of
//! subscribers consume them independently.
//!
//! ## Overview
//!
//! - **Event types**: closed enum hierarchies per domain (catalog, queue,
//!   playback)
//! - **EventBus**: the central broadcast channel
//! - **Subscriptions**: every subscriber sees every event; slow subscribers
//!   observe `RecvError::Lagged` and keep going
//!
//! Events are informational. Nothing in the core waits on an event being
//! consumed, and losing events (lagged subscriber, no subscribers at all) is
//! always safe — authoritative state lives in the stores, not on the bus.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, QueueEvent};
//!
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Queue(QueueEvent::Cleared)).ok();
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Stream-discovery events
    Catalog(CatalogEvent),
    /// Queue mutation events
    Queue(QueueEvent),
    /// Playback lifecycle events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::FatalError { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Notice { .. }) => EventSeverity::Warning,
            CoreEvent::Queue(QueueEvent::Cleared) => EventSeverity::Info,
            CoreEvent::Queue(QueueEvent::EntryAdded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events emitted while observing pages for streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A stream candidate was detected and cached for a page.
    StreamDetected {
        page: String,
        url: String,
        stream_type: String,
    },
    /// A page closed and its cached candidate was evicted.
    PageEvicted { page: String },
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events emitted after committed queue mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    /// An entry was appended to the queue.
    EntryAdded { id: String, title: String },
    /// An entry was removed from the queue.
    EntryRemoved { id: String },
    /// The queue was emptied.
    Cleared,
    /// An entry was prepended and selected for immediate playback.
    PlayNow { id: String },
    /// The current-playback pointer moved.
    IndexChanged { index: usize },
    /// Queue length after a committed mutation. A pure projection for badge
    /// display; `0` means empty.
    BadgeChanged { count: usize },
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A load attempt for the entry at `index` began.
    Loading { index: usize, url: String },
    /// The entry at `index` is playing.
    Playing { index: usize },
    Paused,
    /// Live element clock, forwarded on every progress tick.
    Progress {
        position_secs: f64,
        duration_secs: Option<f64>,
    },
    /// Volume changed; `muted` carries whether a mute snapshot is active.
    VolumeChanged { volume: f64, muted: bool },
    /// A timed, dismissible user-visible notice.
    Notice { text: String, duration_ms: u64 },
    /// A fatal playback failure on the entry at `index`.
    FatalError { index: usize, detail: String },
    /// Playback halted; the queue remains intact for manual retry.
    Stopped,
    /// The current entry played to its end.
    Ended { index: usize },
}

// ============================================================================
// EventBus
// ============================================================================

/// Central broadcast channel for [`CoreEvent`]s.
///
/// Cheap to clone; clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers that will
    /// receive it, or an error when there are none — which is not a fault,
    /// merely nobody listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
