//! # Stream Classifier
//!
//! Turns raw network/DOM observations into typed catalog candidates.
//!
//! ## Overview
//!
//! Pages that play streaming media generate two kinds of observable traffic:
//! a handful of manifest fetches and a flood of segment fetches. This crate
//! decides, per observation, whether there is a playable stream behind it and
//! what family it belongs to. It is a pure function over its input: no I/O,
//! no shared state, no errors — malformed input simply does not classify.
//!
//! A successful classification is a *candidate*. Promoting a candidate into
//! the durable queue is a separate, explicit step owned by the broker.
//!
//! ## Usage
//!
//! ```rust
//! use core_classifier::{classify, Observation, StreamType};
//!
//! let obs = Observation::network(
//!     "https://cdn.example.com/live/master.m3u8",
//!     Some("application/vnd.apple.mpegurl".to_string()),
//! );
//!
//! let candidate = classify(&obs).expect("manifest classifies");
//! assert_eq!(candidate.stream_type, StreamType::Hls);
//! ```

pub mod classify;
pub mod color;
pub mod rules;
pub mod types;

pub use classify::classify;
pub use color::ThumbnailColor;
pub use types::{Observation, ObservationSource, StreamCandidate, StreamType};
