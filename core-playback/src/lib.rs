//! # Playback Control
//!
//! Everything that happens between "the queue says play index *i*" and
//! frames on screen.
//!
//! ## Overview
//!
//! - [`PlaybackController`](controller::PlaybackController) - the load
//!   protocol, stream-type dispatch, fault recovery, end-of-queue policy,
//!   and volume/mute handling for the single on-screen media element
//! - [`EngineSlot`](engine::EngineSlot) - owned home of the current
//!   adaptive-streaming engine; attaching structurally tears the previous
//!   one down first
//! - [`TimerSlot`](timers::TimerSlot) - singular per-purpose timers
//!   (auto-advance, notice expiry, control hiding)
//! - [`PlayerPrefs`](prefs::PlayerPrefs) - durable volume/loop preferences
//! - [`CastSession`](cast::CastSession) - mirror of an opaque remote
//!   receiver
//!
//! Queue state is never owned here: the controller reads snapshots from the
//! broker and commits index changes back through it.

pub mod cast;
pub mod controller;
pub mod engine;
pub mod error;
pub mod prefs;
pub mod timers;

pub use cast::{CastSession, RemoteStatus};
pub use controller::{Nudge, PlaybackController, PlayerCommand, PlayerState};
pub use engine::EngineSlot;
pub use error::{classify_fault, FaultClass, PlaybackError, Result};
pub use prefs::PlayerPrefs;
pub use timers::TimerSlot;
