//! Cloneable client handle to the broker task.

use bridge_traits::surface::SurfaceId;
use core_classifier::{Observation, StreamCandidate};
use core_playlist::EntryId;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

use crate::command::{
    AddOutcome, BrokerCommand, PageId, QueueSnapshot, RemoveOutcome, ResponseEnvelope,
};
use crate::error::{BrokerError, Result};

/// Handle for talking to a running [`SyncBroker`](crate::broker::SyncBroker).
///
/// Cheap to clone; every clone feeds the same command channel. Dropping the
/// last clone stops the broker task.
#[derive(Clone)]
pub struct BrokerHandle {
    tx: mpsc::Sender<BrokerCommand>,
}

impl BrokerHandle {
    pub(crate) fn new(tx: mpsc::Sender<BrokerCommand>) -> Self {
        Self { tx }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        make: impl FnOnce(oneshot::Sender<ResponseEnvelope>) -> BrokerCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| BrokerError::ChannelClosed)?;
        let envelope = rx.await.map_err(|_| BrokerError::ChannelClosed)?;
        envelope.decode()
    }

    async fn send(&self, command: BrokerCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| BrokerError::ChannelClosed)
    }

    // ------------------------------------------------------------------
    // Request/response commands
    // ------------------------------------------------------------------

    /// Current page candidate plus queue state.
    pub async fn snapshot(&self, page: Option<PageId>) -> Result<QueueSnapshot> {
        self.request(|reply| BrokerCommand::GetSnapshot { page, reply })
            .await
    }

    /// Append an explicit candidate, or the last one observed on `page`.
    pub async fn add_to_queue(
        &self,
        entry: Option<StreamCandidate>,
        page: Option<PageId>,
    ) -> Result<AddOutcome> {
        self.request(|reply| BrokerCommand::AddToQueue { entry, page, reply })
            .await
    }

    /// Queue-jump: prepend, select, surface the player.
    pub async fn play_now(
        &self,
        entry: Option<StreamCandidate>,
        page: Option<PageId>,
    ) -> Result<AddOutcome> {
        self.request(|reply| BrokerCommand::PlayNow { entry, page, reply })
            .await
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.request(|reply| BrokerCommand::ClearQueue { reply })
            .await
    }

    pub async fn remove_by_id(&self, id: EntryId) -> Result<RemoveOutcome> {
        self.request(|reply| BrokerCommand::RemoveById { id, reply })
            .await
    }

    pub async fn set_current_index(&self, index: usize) -> Result<()> {
        self.request(|reply| BrokerCommand::SetCurrentIndex { index, reply })
            .await
    }

    /// Register the player surface the broker should notify from now on.
    pub async fn register_surface(&self, id: SurfaceId) -> Result<()> {
        self.request(|reply| BrokerCommand::RegisterSurface { id, reply })
            .await
    }

    /// Request byte-level segment capture. The feature is disabled, so this
    /// always comes back [`BrokerError::Rejected`].
    pub async fn capture_segment(&self, page: PageId) -> Result<()> {
        self.request(|reply| BrokerCommand::CaptureSegment { page, reply })
            .await
    }

    // ------------------------------------------------------------------
    // One-way observation path
    // ------------------------------------------------------------------

    /// Report a finished network response on `page`.
    pub async fn observe_response(
        &self,
        page: PageId,
        observation: Observation,
        status: u16,
    ) -> Result<()> {
        self.send(BrokerCommand::ObserveResponse {
            page,
            observation,
            status,
        })
        .await
    }

    /// Report a media element discovered in `page`'s DOM.
    pub async fn observe_media(&self, page: PageId, observation: Observation) -> Result<()> {
        self.send(BrokerCommand::ObserveMedia { page, observation })
            .await
    }

    /// Report that `page` closed.
    pub async fn page_closed(&self, page: PageId) -> Result<()> {
        self.send(BrokerCommand::PageClosed { page }).await
    }
}

impl std::fmt::Debug for BrokerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
