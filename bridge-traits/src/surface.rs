//! Player Surface Abstractions
//!
//! The player surface is the single dedicated execution context that drives
//! the visible media element. The broker holds nothing more than an
//! identifier for it; the surface may disappear at any time, so liveness is
//! re-checked before every use rather than assumed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Opaque identifier for a player surface.
///
/// This is a back-reference, not ownership: holding a `SurfaceId` gives no
/// guarantee the surface still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    /// Generate a new surface identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse an identifier from its string form, as persisted in session
    /// storage. Returns `None` for anything that is not a UUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Envelope for a best-effort push to the player surface.
///
/// Notifications reuse the command envelope shape (`command` tag plus JSON
/// payload) but expect no reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacePush {
    /// Notification tag (e.g. `"added"`, `"removed"`, `"cleared"`, `"play_now"`).
    pub command: String,
    /// Structured payload; `Value::Null` when the notification carries none.
    pub payload: Value,
}

impl SurfacePush {
    pub fn new(command: impl Into<String>, payload: Value) -> Self {
        Self {
            command: command.into(),
            payload,
        }
    }
}

/// Host trait for creating, focusing, and pushing to player surfaces.
///
/// Pushes are at-most-once and best-effort: there is no retry and no
/// delivery guarantee. A push to a dead surface returns
/// [`BridgeError::SurfaceGone`](crate::error::BridgeError::SurfaceGone),
/// which the broker treats as a cue to drop its stored reference, never as
/// an error to propagate.
#[async_trait]
pub trait SurfaceHost: Send + Sync {
    /// Create a fresh player surface and return its identifier.
    async fn open(&self) -> Result<SurfaceId>;

    /// Bring an existing surface to the foreground.
    ///
    /// Fails with `SurfaceGone` if the surface no longer exists.
    async fn focus(&self, id: SurfaceId) -> Result<()>;

    /// Check whether the surface still exists.
    async fn is_alive(&self, id: SurfaceId) -> bool;

    /// Push a notification to the surface, fire-and-forget.
    async fn push(&self, id: SurfaceId, message: SurfacePush) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_id_is_unique() {
        let a = SurfaceId::new();
        let b = SurfaceId::new();
        assert_ne!(a, b);
        assert_eq!(a, SurfaceId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn surface_id_round_trips_through_string() {
        let id = SurfaceId::new();
        assert_eq!(SurfaceId::parse(&id.to_string()), Some(id));
        assert_eq!(SurfaceId::parse("not-a-uuid"), None);
    }
}
