//! Channel-backed player surface host.
//!
//! Each surface is a bounded mpsc channel: the broker pushes notifications
//! into the sender half, the surface context consumes the receiver half.
//! A dropped receiver is exactly what a closed surface looks like, which
//! makes liveness observable without any bookkeeping protocol.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    surface::{SurfaceHost, SurfaceId, SurfacePush},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Capacity of each surface's notification channel. Notifications are
/// best-effort, so a full channel counts as a failed push rather than
/// applying backpressure to the broker.
const SURFACE_CHANNEL_CAPACITY: usize = 32;

/// Surface host where surfaces are in-process notification channels.
#[derive(Default)]
pub struct ChannelSurfaceHost {
    surfaces: Mutex<HashMap<SurfaceId, mpsc::Sender<SurfacePush>>>,
    pending: Mutex<HashMap<SurfaceId, mpsc::Receiver<SurfacePush>>>,
    focused: Mutex<Option<SurfaceId>>,
}

impl ChannelSurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the receiving half of a surface's channel. The surface context
    /// calls this once after `open`; the surface counts as dead once the
    /// receiver is dropped.
    pub fn take_receiver(&self, id: SurfaceId) -> Option<mpsc::Receiver<SurfacePush>> {
        self.pending.lock().remove(&id)
    }

    /// The surface most recently brought to the foreground, if any.
    pub fn focused(&self) -> Option<SurfaceId> {
        *self.focused.lock()
    }

    /// Number of surfaces ever opened and not yet discarded.
    pub fn surface_count(&self) -> usize {
        self.surfaces.lock().len()
    }

    fn sender_for(&self, id: SurfaceId) -> Option<mpsc::Sender<SurfacePush>> {
        self.surfaces.lock().get(&id).cloned()
    }

    fn discard(&self, id: SurfaceId) {
        self.surfaces.lock().remove(&id);
        self.pending.lock().remove(&id);
        let mut focused = self.focused.lock();
        if *focused == Some(id) {
            *focused = None;
        }
    }
}

#[async_trait]
impl SurfaceHost for ChannelSurfaceHost {
    async fn open(&self) -> Result<SurfaceId> {
        let id = SurfaceId::new();
        let (tx, rx) = mpsc::channel(SURFACE_CHANNEL_CAPACITY);
        self.surfaces.lock().insert(id, tx);
        self.pending.lock().insert(id, rx);
        *self.focused.lock() = Some(id);
        debug!(%id, "opened player surface");
        Ok(id)
    }

    async fn focus(&self, id: SurfaceId) -> Result<()> {
        let Some(sender) = self.sender_for(id) else {
            return Err(BridgeError::SurfaceGone(id.to_string()));
        };
        if sender.is_closed() {
            self.discard(id);
            return Err(BridgeError::SurfaceGone(id.to_string()));
        }
        *self.focused.lock() = Some(id);
        Ok(())
    }

    async fn is_alive(&self, id: SurfaceId) -> bool {
        match self.sender_for(id) {
            Some(sender) => !sender.is_closed(),
            None => false,
        }
    }

    async fn push(&self, id: SurfaceId, message: SurfacePush) -> Result<()> {
        let Some(sender) = self.sender_for(id) else {
            return Err(BridgeError::SurfaceGone(id.to_string()));
        };

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.discard(id);
                Err(BridgeError::SurfaceGone(id.to_string()))
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Best-effort contract: drop rather than block the broker.
                warn!(%id, "surface channel full, dropping notification");
                Err(BridgeError::OperationFailed(format!(
                    "surface {id} not keeping up"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn open_push_receive() {
        let host = ChannelSurfaceHost::new();
        let id = host.open().await.unwrap();
        let mut rx = host.take_receiver(id).unwrap();

        host.push(id, SurfacePush::new("added", json!({"id": "x"})))
            .await
            .unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.command, "added");
    }

    #[tokio::test]
    async fn dropped_receiver_means_dead_surface() {
        let host = ChannelSurfaceHost::new();
        let id = host.open().await.unwrap();
        let rx = host.take_receiver(id).unwrap();
        assert!(host.is_alive(id).await);

        drop(rx);
        assert!(!host.is_alive(id).await);

        let err = host
            .push(id, SurfacePush::new("cleared", serde_json::Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::SurfaceGone(_)));
    }

    #[tokio::test]
    async fn focus_fails_for_unknown_surface() {
        let host = ChannelSurfaceHost::new();
        let err = host.focus(SurfaceId::new()).await.unwrap_err();
        assert!(matches!(err, BridgeError::SurfaceGone(_)));
    }

    #[tokio::test]
    async fn last_opened_surface_is_focused() {
        let host = ChannelSurfaceHost::new();
        let a = host.open().await.unwrap();
        let _rx_a = host.take_receiver(a).unwrap();
        let b = host.open().await.unwrap();
        let _rx_b = host.take_receiver(b).unwrap();

        assert_eq!(host.focused(), Some(b));
        host.focus(a).await.unwrap();
        assert_eq!(host.focused(), Some(a));
    }
}
