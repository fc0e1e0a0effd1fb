//! # Desktop Bridge Implementations
//!
//! Native adapters for the host bridge traits:
//!
//! - [`MemorySessionStore`](session::MemorySessionStore) - session-scoped
//!   key-value area as a process-local map
//! - [`SqliteSettingsStore`](settings::SqliteSettingsStore) - durable
//!   preferences in SQLite via `sqlx`
//! - [`ChannelSurfaceHost`](surface::ChannelSurfaceHost) - player surfaces
//!   as in-process notification channels with observable liveness

pub mod session;
pub mod settings;
pub mod surface;

pub use session::MemorySessionStore;
pub use settings::SqliteSettingsStore;
pub use surface::ChannelSurfaceHost;
