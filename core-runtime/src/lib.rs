//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the queue core:
//! - Logging and tracing bootstrap
//! - Runtime settings
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other core crates depend
//! on. It establishes the logging conventions and the event broadcasting
//! mechanism used throughout the system, and carries the tunables (timer
//! durations, queue cap, channel sizes) that the broker and the playback
//! controller read.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::RuntimeSettings;
pub use error::{Error, Result};
pub use events::{CatalogEvent, CoreEvent, EventBus, PlaybackEvent, QueueEvent};
