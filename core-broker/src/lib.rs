//! # Sync Broker
//!
//! The single authority over shared queue state.
//!
//! ## Overview
//!
//! Observations arrive from many pages at once, the player surface mutates
//! the queue, and the badge projection must stay consistent with both. The
//! broker resolves all of that by construction: one long-lived actor task
//! owns the playlist store, the per-page observation cache, and the surface
//! reference, and processes commands strictly in arrival order off one mpsc
//! channel. Callers hold a cloneable [`BrokerHandle`] and get exactly one
//! reply per request; observation reports are one-way.
//!
//! Failures inside the broker are flattened into
//! `{ success: false, error }` envelopes. Notifications to the player
//! surface are best-effort: a push to a dead surface silently drops the
//! stored reference and is never reported back to the requesting caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bridge_desktop::{ChannelSurfaceHost, MemorySessionStore, SqliteSettingsStore};
//! use bridge_traits::time::SystemClock;
//! use core_broker::SyncBroker;
//! use core_playlist::PlaylistStore;
//! use core_runtime::events::EventBus;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlaylistStore::new(
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(SqliteSettingsStore::in_memory().await?),
//!     50,
//! );
//! let handle = SyncBroker::spawn(
//!     store,
//!     Arc::new(ChannelSurfaceHost::new()),
//!     Arc::new(SystemClock),
//!     EventBus::default(),
//!     64,
//! );
//! let snapshot = handle.snapshot(None).await?;
//! assert_eq!(snapshot.count, 0);
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod command;
pub mod error;
pub mod handle;

pub use broker::{SyncBroker, DEFAULT_COMMAND_BUFFER};
pub use command::{AddOutcome, PageId, QueueSnapshot, RemoveOutcome, ResponseEnvelope};
pub use error::{BrokerError, Result};
pub use handle::BrokerHandle;
