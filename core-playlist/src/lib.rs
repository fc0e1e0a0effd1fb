//! # Playlist Store
//!
//! The shared playback queue and its persistence rules: ordered entries plus
//! the current-playback pointer in session-scoped storage, volume
//! preferences in durable storage.
//!
//! All mutations are read-modify-write sequences with no transaction support
//! underneath, so the store has exactly one writer — the broker. See
//! [`store::PlaylistStore`] for the contract.

pub mod error;
pub mod models;
pub mod store;

pub use error::{PlaylistError, Result};
pub use models::{EntryId, VideoEntry};
pub use store::{reclamp_index, PlaylistStore, DEFAULT_PREVIOUS_VOLUME, DEFAULT_VOLUME};
