//! Media Element and Adaptive-Streaming Engine Abstractions
//!
//! The playback controller drives exactly one on-screen media element and,
//! for adaptive formats, one streaming engine bound to that element. Both are
//! external collaborators: the engine fetches and assembles segments per a
//! manifest, the element renders the decoded result. These traits capture the
//! contract the controller relies on and nothing more.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::error::Result;

/// Fault families reported by elements and engines.
///
/// The playback controller maps these onto its recovery actions: `Network`
/// faults restart the current load, `Media` faults get one in-place recovery
/// attempt, `Other` faults are fatal when flagged so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// Transport-level failure (manifest or segment fetch).
    Network,
    /// Decode or buffer failure in the media pipeline.
    Media,
    /// Anything else the source component could not classify.
    Other,
}

/// A fault raised by the element or the engine during a load or playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFault {
    pub kind: FaultKind,
    /// Whether the reporting component considers the fault unrecoverable.
    pub fatal: bool,
    pub detail: String,
}

impl MediaFault {
    pub fn new(kind: FaultKind, fatal: bool, detail: impl Into<String>) -> Self {
        Self {
            kind,
            fatal,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for MediaFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} fault ({}): {}",
            self.kind,
            if self.fatal { "fatal" } else { "recoverable" },
            self.detail
        )
    }
}

/// Events emitted by a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    /// Playback started or resumed.
    Playing,
    /// Playback paused.
    Paused,
    /// Progress tick with the element's live clock.
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },
    /// The current source played to its end.
    Ended,
    /// The element failed to load or decode its source.
    Fault(MediaFault),
}

/// Events emitted by a streaming engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The manifest was fetched and parsed; playback may begin.
    ManifestParsed,
    /// The engine hit a fault while fetching or buffering.
    Fault(MediaFault),
}

/// The single on-screen media element the controller drives.
///
/// An optional decorative mirror element shares the same source; hosts that
/// provide one apply every source/transport call to both. The controller
/// never addresses the mirror directly.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Assign a source URL directly to the element (progressive playback).
    async fn set_source(&self, url: &str) -> Result<()>;

    /// Detach the current source and reset the position to zero.
    async fn clear_source(&self) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position within the current source.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Set the element volume, `0.0..=1.0`.
    async fn set_volume(&self, volume: f64) -> Result<()>;

    /// Whether the element natively understands the given content type.
    fn can_play(&self, content_type: &str) -> bool;

    /// Subscribe to element events. Every subscriber sees every event; slow
    /// subscribers may observe `Lagged` and should resynchronize from the
    /// next tick.
    fn subscribe(&self) -> broadcast::Receiver<ElementEvent>;
}

/// An adaptive-streaming engine instance bound to one media element.
///
/// Instances are single-use: one `create` → `load` → `dispose` cycle per load
/// attempt. The controller guarantees `dispose` completes before another
/// engine is attached to the same element.
#[async_trait]
pub trait StreamEngine: Send + Sync {
    /// Begin loading the given manifest URL.
    async fn load(&self, manifest_url: &str) -> Result<()>;

    /// Attempt an in-place recovery of the media pipeline after a
    /// recoverable decode/buffer fault. Errors here mean the fault should be
    /// reclassified as fatal.
    async fn recover_media(&self) -> Result<()>;

    /// Tear the engine down: detach from the element, cancel in-flight
    /// fetches, release buffers. Consumes the instance.
    async fn dispose(self: Box<Self>) -> Result<()>;

    /// Subscribe to engine events.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}

/// Factory for streaming engine instances.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Whether the runtime supports engine-backed adaptive playback at all.
    /// When `false`, HLS entries fall back to native element playback.
    fn is_supported(&self) -> bool;

    /// Create a new engine attached to the given element.
    async fn create(&self, element: Arc<dyn MediaElement>) -> Result<Box<dyn StreamEngine>>;
}
