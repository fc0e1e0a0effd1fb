//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host
//! environment the queue core runs in.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the host.
//! Each trait represents a capability the core requires but that is provided
//! differently per host: where state is persisted, how the player surface is
//! opened and focused, and what actually fetches and renders media.
//!
//! ## Traits
//!
//! ### Storage
//! - [`SessionStore`](storage::SessionStore) - session-scoped key-value area (queue, index, surface id)
//! - [`SettingsStore`](storage::SettingsStore) - durable preferences (volume, loop toggle)
//!
//! ### Player surface
//! - [`SurfaceHost`](surface::SurfaceHost) - open/focus/liveness plus best-effort notification push
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - the single on-screen element the controller drives
//! - [`StreamEngine`](media::StreamEngine) / [`EngineFactory`](media::EngineFactory) - adaptive-streaming engine seam
//! - [`CastSink`](cast::CastSink) - opaque remote-casting receiver
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host
//! implementations convert their native failures into it and keep messages
//! actionable. A dead player surface is a distinct variant
//! (`SurfaceGone`) because the broker reacts to it differently from other
//! failures: it drops its stored reference instead of reporting an error.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind `Arc`.

pub mod cast;
pub mod error;
pub mod media;
pub mod storage;
pub mod surface;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use cast::{CastCommand, CastEvent, CastSink};
pub use media::{
    ElementEvent, EngineEvent, EngineFactory, FaultKind, MediaElement, MediaFault, StreamEngine,
};
pub use storage::{SessionStore, SettingsStore};
pub use surface::{SurfaceHost, SurfaceId, SurfacePush};
pub use time::{Clock, SystemClock};
