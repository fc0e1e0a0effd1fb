//! Command protocol between callers and the broker task.
//!
//! Every state-touching request is a [`BrokerCommand`] carried over the
//! broker's mpsc channel. Request/response commands embed a oneshot reply
//! sender and are answered exactly once with a [`ResponseEnvelope`];
//! observation-path commands are one-way and never answered.

use bridge_traits::surface::SurfaceId;
use core_classifier::{Observation, StreamCandidate};
use core_playlist::{EntryId, VideoEntry};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{BrokerError, Result};

/// Identifier of an observed page. Opaque to the broker; the host picks the
/// scheme (tab id, window id, URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Flattened reply to a request/response command.
///
/// Errors never cross the channel as panics or typed error values; they are
/// collapsed into `success: false` plus a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful reply carrying a payload.
    pub fn ok(payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self {
                success: true,
                payload: Some(value),
                error: None,
            },
            Err(e) => Self::fail(format!("payload encoding failed: {e}")),
        }
    }

    /// Successful reply with no payload.
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            payload: None,
            error: None,
        }
    }

    /// Failed reply with a message.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.into()),
        }
    }

    /// Decode the envelope into the payload type the caller expects.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        if !self.success {
            return Err(BrokerError::Rejected(
                self.error.unwrap_or_else(|| "unspecified failure".into()),
            ));
        }
        let payload = self.payload.unwrap_or(Value::Null);
        serde_json::from_value(payload).map_err(|e| BrokerError::Protocol(e.to_string()))
    }
}

/// Combined view answered by `GetSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Last known candidate observed on the asking page, if any.
    pub candidate: Option<StreamCandidate>,
    pub entries: Vec<VideoEntry>,
    pub current_index: usize,
    pub count: usize,
}

/// Result of `AddToQueue` / `PlayNow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutcome {
    /// `false` when the entry was already queued.
    pub added: bool,
    /// The queued entry: the freshly created one, or the pre-existing
    /// duplicate it collided with.
    pub entry: VideoEntry,
}

/// Result of `RemoveById`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOutcome {
    /// `false` when no entry with the given id existed.
    pub removed: bool,
    pub remaining: Vec<VideoEntry>,
    pub current_index: usize,
}

type Reply = oneshot::Sender<ResponseEnvelope>;

/// A request to the broker task.
pub enum BrokerCommand {
    /// Current page candidate plus queue state, in one consistent read.
    GetSnapshot { page: Option<PageId>, reply: Reply },

    /// Append to the queue: an explicit candidate, or the last one observed
    /// on `page`.
    AddToQueue {
        entry: Option<StreamCandidate>,
        page: Option<PageId>,
        reply: Reply,
    },

    /// Queue-jump: dedup-prepend, select index 0, open/focus the player
    /// surface, notify it.
    PlayNow {
        entry: Option<StreamCandidate>,
        page: Option<PageId>,
        reply: Reply,
    },

    ClearQueue { reply: Reply },

    RemoveById { id: EntryId, reply: Reply },

    SetCurrentIndex { index: usize, reply: Reply },

    /// Adopt a player surface; the latest registration always wins.
    RegisterSurface { id: SurfaceId, reply: Reply },

    /// Byte-level segment capture. Permanently disabled; always refused.
    CaptureSegment { page: PageId, reply: Reply },

    /// One-way: a network response finished on `page`.
    ObserveResponse {
        page: PageId,
        observation: Observation,
        status: u16,
    },

    /// One-way: a media element was found in `page`'s DOM.
    ObserveMedia {
        page: PageId,
        observation: Observation,
    },

    /// One-way: `page` closed; drop its cached observation.
    PageClosed { page: PageId },
}

impl std::fmt::Debug for BrokerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BrokerCommand::GetSnapshot { .. } => "GetSnapshot",
            BrokerCommand::AddToQueue { .. } => "AddToQueue",
            BrokerCommand::PlayNow { .. } => "PlayNow",
            BrokerCommand::ClearQueue { .. } => "ClearQueue",
            BrokerCommand::RemoveById { .. } => "RemoveById",
            BrokerCommand::SetCurrentIndex { .. } => "SetCurrentIndex",
            BrokerCommand::RegisterSurface { .. } => "RegisterSurface",
            BrokerCommand::CaptureSegment { .. } => "CaptureSegment",
            BrokerCommand::ObserveResponse { .. } => "ObserveResponse",
            BrokerCommand::ObserveMedia { .. } => "ObserveMedia",
            BrokerCommand::PageClosed { .. } => "PageClosed",
        };
        f.write_str(name)
    }
}
