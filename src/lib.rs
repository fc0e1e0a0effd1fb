//! Workspace facade crate.
//!
//! Re-exports the member crates so host applications can depend on
//! `vidqueue-workspace` alone and wire up the whole queue core: bridge
//! traits and desktop adapters, the classifier, the playlist store, the
//! broker, and the playback controller.

pub use bridge_desktop;
pub use bridge_traits;
pub use core_broker as broker;
pub use core_classifier as classifier;
pub use core_playback as playback;
pub use core_playlist as playlist;
pub use core_runtime as runtime;
