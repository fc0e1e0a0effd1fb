//! Remote-Casting Sink Abstraction
//!
//! The casting integration is an opaque collaborator: the controller sends it
//! load/transport/volume commands and mirrors whatever state it reports back.
//! No assumptions are made about the underlying protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;

/// Commands accepted by a remote-casting sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CastCommand {
    /// Load media on the remote receiver and start playing.
    Load {
        media_url: String,
        /// Content type hint for the receiver (e.g. `application/x-mpegurl`).
        content_type: String,
        title: String,
    },
    Play,
    Pause,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Adjust remote volume. `level` and `muted` are each optional so a mute
    /// toggle does not have to restate the level.
    SetVolume {
        level: Option<f64>,
        muted: Option<bool>,
    },
}

/// Events emitted by a remote-casting sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CastEvent {
    /// Remote playback state changed.
    StateChanged { is_playing: bool },
    /// Remote playback clock tick, in seconds.
    TimeUpdated { current: f64, duration: f64 },
    /// Remote volume changed.
    VolumeChanged { level: f64, muted: bool },
    /// The remote side reported an error.
    Error { message: String },
    /// The connection closed or was terminated.
    Disconnected,
}

/// A connection to a remote playback receiver.
#[async_trait]
pub trait CastSink: Send + Sync {
    /// Send a command to the receiver. Commands sent while disconnected fail
    /// with `OperationFailed`.
    async fn send(&self, command: CastCommand) -> Result<()>;

    /// Whether a receiver connection is currently established.
    fn is_connected(&self) -> bool;

    /// Subscribe to remote state events.
    fn subscribe(&self) -> broadcast::Receiver<CastEvent>;
}
