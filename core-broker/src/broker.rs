//! The broker actor.
//!
//! Exactly one `SyncBroker` task runs per session. It owns the playlist
//! store, the per-page observation cache, and the player-surface reference,
//! and it processes commands strictly one at a time off a single mpsc
//! channel. That serialization is the concurrency model: there is no lock
//! because there is no second writer.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::{
    error::BridgeError,
    surface::{SurfaceHost, SurfaceId, SurfacePush},
    time::Clock,
};
use core_classifier::{classify, Observation, ObservationSource, StreamCandidate};
use core_playlist::{reclamp_index, EntryId, PlaylistStore, VideoEntry};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, QueueEvent};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::command::{
    AddOutcome, BrokerCommand, PageId, QueueSnapshot, RemoveOutcome, ResponseEnvelope,
};
use crate::handle::BrokerHandle;

/// Default capacity of the broker's command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// The single authority over queue state.
///
/// Constructed with [`SyncBroker::spawn`], which moves it onto its own task
/// and hands back a cloneable [`BrokerHandle`]. The task exits once every
/// handle is dropped.
pub struct SyncBroker {
    store: PlaylistStore,
    surfaces: Arc<dyn SurfaceHost>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    /// Last classified candidate per open page; last write wins.
    observations: HashMap<PageId, StreamCandidate>,
    /// The registered player surface, if one is believed alive.
    surface: Option<SurfaceId>,
}

impl SyncBroker {
    /// Spawn the broker task and return a handle to it.
    pub fn spawn(
        store: PlaylistStore,
        surfaces: Arc<dyn SurfaceHost>,
        clock: Arc<dyn Clock>,
        bus: EventBus,
        command_buffer: usize,
    ) -> BrokerHandle {
        let (tx, rx) = mpsc::channel(command_buffer);
        let broker = Self {
            store,
            surfaces,
            clock,
            bus,
            observations: HashMap::new(),
            surface: None,
        };
        tokio::spawn(broker.run(rx));
        BrokerHandle::new(tx)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<BrokerCommand>) {
        info!("broker task started");
        // A surface registered earlier in this session may still be around.
        match self.store.surface_id().await {
            Ok(id) => self.surface = id,
            Err(e) => warn!(error = %e, "could not restore surface reference"),
        }
        while let Some(command) = rx.recv().await {
            debug!(?command, "handling command");
            self.handle(command).await;
        }
        info!("broker task stopped");
    }

    async fn handle(&mut self, command: BrokerCommand) {
        match command {
            BrokerCommand::GetSnapshot { page, reply } => {
                let env = self.snapshot(page.as_ref()).await;
                let _ = reply.send(env);
            }
            BrokerCommand::AddToQueue { entry, page, reply } => {
                let env = self.add_to_queue(entry, page.as_ref()).await;
                let _ = reply.send(env);
            }
            BrokerCommand::PlayNow { entry, page, reply } => {
                let env = self.play_now(entry, page.as_ref()).await;
                let _ = reply.send(env);
            }
            BrokerCommand::ClearQueue { reply } => {
                let _ = reply.send(self.clear_queue().await);
            }
            BrokerCommand::RemoveById { id, reply } => {
                let _ = reply.send(self.remove_by_id(id).await);
            }
            BrokerCommand::SetCurrentIndex { index, reply } => {
                let _ = reply.send(self.set_current_index(index).await);
            }
            BrokerCommand::RegisterSurface { id, reply } => {
                debug!(%id, "surface registered");
                self.adopt_surface(id).await;
                let _ = reply.send(ResponseEnvelope::ok_empty());
            }
            BrokerCommand::CaptureSegment { page, reply } => {
                warn!(%page, "segment capture requested but the feature is disabled");
                let _ = reply.send(ResponseEnvelope::fail("segment capture is disabled"));
            }
            BrokerCommand::ObserveResponse {
                page,
                observation,
                status,
            } => {
                self.observe_response(page, observation, status);
            }
            BrokerCommand::ObserveMedia { page, observation } => {
                self.observe(page, observation);
            }
            BrokerCommand::PageClosed { page } => {
                if self.observations.remove(&page).is_some() {
                    debug!(%page, "evicted cached observation");
                    self.emit(CoreEvent::Catalog(CatalogEvent::PageEvicted {
                        page: page.to_string(),
                    }));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Observation path
    // ------------------------------------------------------------------

    fn observe_response(&mut self, page: PageId, observation: Observation, status: u16) {
        // Only completed, successful responses count as evidence of a
        // playable stream.
        if !(200..300).contains(&status) {
            return;
        }
        debug_assert_eq!(observation.source, ObservationSource::NetworkResponse);
        self.observe(page, observation);
    }

    fn observe(&mut self, page: PageId, observation: Observation) {
        let Some(candidate) = classify(&observation) else {
            return;
        };
        debug!(
            %page,
            url = %candidate.url,
            stream_type = %candidate.stream_type,
            "cached stream candidate"
        );
        self.emit(CoreEvent::Catalog(CatalogEvent::StreamDetected {
            page: page.to_string(),
            url: candidate.url.clone(),
            stream_type: candidate.stream_type.to_string(),
        }));
        self.observations.insert(page, candidate);
    }

    /// Resolve the candidate a queue command refers to: an explicit payload
    /// wins, else the last known observation for the page. The cache entry
    /// is not consumed; it stays until the page closes.
    fn resolve_candidate(
        &self,
        entry: Option<StreamCandidate>,
        page: Option<&PageId>,
    ) -> Option<StreamCandidate> {
        entry.or_else(|| page.and_then(|p| self.observations.get(p).cloned()))
    }

    // ------------------------------------------------------------------
    // Queue commands
    // ------------------------------------------------------------------

    async fn snapshot(&self, page: Option<&PageId>) -> ResponseEnvelope {
        let entries = match self.store.list().await {
            Ok(entries) => entries,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };
        let current_index = match self.store.index().await {
            Ok(index) => index,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };
        let count = entries.len();
        ResponseEnvelope::ok(QueueSnapshot {
            candidate: page.and_then(|p| self.observations.get(p).cloned()),
            entries,
            current_index,
            count,
        })
    }

    async fn add_to_queue(
        &mut self,
        entry: Option<StreamCandidate>,
        page: Option<&PageId>,
    ) -> ResponseEnvelope {
        let Some(candidate) = self.resolve_candidate(entry, page) else {
            return ResponseEnvelope::fail("no stream observed for this page");
        };
        let entry = VideoEntry::from_candidate(candidate, self.clock.as_ref());

        match self.store.append(entry.clone()).await {
            Ok(true) => {
                self.notify("added", json!({ "entry": entry })).await;
                self.emit(CoreEvent::Queue(QueueEvent::EntryAdded {
                    id: entry.id.to_string(),
                    title: entry.title.clone(),
                }));
                self.publish_badge().await;
                ResponseEnvelope::ok(AddOutcome { added: true, entry })
            }
            Ok(false) => match self.existing_duplicate(&entry).await {
                Ok(Some(existing)) => ResponseEnvelope::ok(AddOutcome {
                    added: false,
                    entry: existing,
                }),
                Ok(None) => ResponseEnvelope::fail("duplicate entry vanished mid-command"),
                Err(e) => ResponseEnvelope::fail(e.to_string()),
            },
            // QueueFull and storage failures alike flatten into the envelope.
            Err(e) => ResponseEnvelope::fail(e.to_string()),
        }
    }

    async fn play_now(
        &mut self,
        entry: Option<StreamCandidate>,
        page: Option<&PageId>,
    ) -> ResponseEnvelope {
        let Some(candidate) = self.resolve_candidate(entry, page) else {
            return ResponseEnvelope::fail("no stream observed for this page");
        };
        let entry = VideoEntry::from_candidate(candidate, self.clock.as_ref());

        let outcome = match self.store.prepend_and_select(entry.clone()).await {
            Ok(true) => {
                self.emit(CoreEvent::Queue(QueueEvent::PlayNow {
                    id: entry.id.to_string(),
                }));
                self.emit(CoreEvent::Queue(QueueEvent::IndexChanged { index: 0 }));
                self.publish_badge().await;
                AddOutcome { added: true, entry }
            }
            Ok(false) => {
                // Queue-jumping an already queued stream selects the
                // existing entry instead of duplicating it.
                match self.select_duplicate(&entry).await {
                    Ok(Some(existing)) => AddOutcome {
                        added: false,
                        entry: existing,
                    },
                    Ok(None) => {
                        return ResponseEnvelope::fail("duplicate entry vanished mid-command")
                    }
                    Err(e) => return ResponseEnvelope::fail(e.to_string()),
                }
            }
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };

        if let Err(e) = self.ensure_surface().await {
            // The queue mutation is already committed; a missing surface is
            // not a reason to report failure for it.
            warn!(error = %e, "could not open or focus the player surface");
        }
        self.notify("play_now", json!({ "entry": outcome.entry }))
            .await;

        ResponseEnvelope::ok(outcome)
    }

    async fn clear_queue(&mut self) -> ResponseEnvelope {
        if let Err(e) = self.store.clear().await {
            return ResponseEnvelope::fail(e.to_string());
        }
        self.notify("cleared", serde_json::Value::Null).await;
        self.emit(CoreEvent::Queue(QueueEvent::Cleared));
        self.publish_badge().await;
        ResponseEnvelope::ok_empty()
    }

    async fn remove_by_id(&mut self, id: EntryId) -> ResponseEnvelope {
        let entries = match self.store.list().await {
            Ok(entries) => entries,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };
        let Some(removed_index) = entries.iter().position(|e| e.id == id) else {
            // Absent id: succeed without touching anything.
            let current_index = match self.store.index().await {
                Ok(index) => index,
                Err(e) => return ResponseEnvelope::fail(e.to_string()),
            };
            return ResponseEnvelope::ok(RemoveOutcome {
                removed: false,
                remaining: entries,
                current_index,
            });
        };

        let current = match self.store.index().await {
            Ok(index) => index,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };
        let remaining = match self.store.remove_by_id(id).await {
            Ok(remaining) => remaining,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };

        let new_index = reclamp_index(current, removed_index, remaining.len());
        if new_index != current {
            if let Err(e) = self.store.set_index(new_index).await {
                return ResponseEnvelope::fail(e.to_string());
            }
            self.emit(CoreEvent::Queue(QueueEvent::IndexChanged { index: new_index }));
        }

        self.notify("removed", json!({ "id": id.to_string() })).await;
        self.emit(CoreEvent::Queue(QueueEvent::EntryRemoved {
            id: id.to_string(),
        }));
        self.publish_badge().await;

        ResponseEnvelope::ok(RemoveOutcome {
            removed: true,
            remaining,
            current_index: new_index,
        })
    }

    async fn set_current_index(&mut self, index: usize) -> ResponseEnvelope {
        let len = match self.store.len().await {
            Ok(len) => len,
            Err(e) => return ResponseEnvelope::fail(e.to_string()),
        };
        if index >= len {
            return ResponseEnvelope::fail(format!(
                "index {index} out of range for queue of {len}"
            ));
        }
        if let Err(e) = self.store.set_index(index).await {
            return ResponseEnvelope::fail(e.to_string());
        }
        self.emit(CoreEvent::Queue(QueueEvent::IndexChanged { index }));
        ResponseEnvelope::ok_empty()
    }

    // ------------------------------------------------------------------
    // Duplicate lookup
    // ------------------------------------------------------------------

    async fn existing_duplicate(
        &self,
        entry: &VideoEntry,
    ) -> core_playlist::Result<Option<VideoEntry>> {
        let entries = self.store.list().await?;
        Ok(entries.into_iter().find(|e| e.duplicates(entry)))
    }

    /// Find the duplicate of `entry` and move the playback pointer onto it.
    async fn select_duplicate(
        &self,
        entry: &VideoEntry,
    ) -> core_playlist::Result<Option<VideoEntry>> {
        let entries = self.store.list().await?;
        let Some(position) = entries.iter().position(|e| e.duplicates(entry)) else {
            return Ok(None);
        };
        self.store.set_index(position).await?;
        self.emit(CoreEvent::Queue(QueueEvent::IndexChanged { index: position }));
        Ok(Some(entries[position].clone()))
    }

    // ------------------------------------------------------------------
    // Surface plumbing
    // ------------------------------------------------------------------

    /// Make sure a live player surface exists and is focused, opening a new
    /// one if the stored reference is stale.
    async fn ensure_surface(&mut self) -> Result<(), BridgeError> {
        if let Some(id) = self.surface {
            if self.surfaces.is_alive(id).await {
                return self.surfaces.focus(id).await;
            }
            debug!(%id, "stored surface is gone, opening a new one");
            self.drop_surface().await;
        }
        let id = self.surfaces.open().await?;
        self.adopt_surface(id).await;
        Ok(())
    }

    /// Remember `id` as the surface to notify, in memory and in the session
    /// area so a restarted broker finds it again.
    async fn adopt_surface(&mut self, id: SurfaceId) {
        self.surface = Some(id);
        if let Err(e) = self.store.set_surface_id(id).await {
            warn!(error = %e, "could not persist surface reference");
        }
    }

    async fn drop_surface(&mut self) {
        self.surface = None;
        if let Err(e) = self.store.clear_surface_id().await {
            warn!(error = %e, "could not clear surface reference");
        }
    }

    /// Best-effort notification push. A dead surface invalidates the stored
    /// reference; no failure is ever reported to the command's caller.
    async fn notify(&mut self, command: &str, payload: serde_json::Value) {
        let Some(id) = self.surface else {
            return;
        };
        match self
            .surfaces
            .push(id, SurfacePush::new(command, payload))
            .await
        {
            Ok(()) => {}
            Err(BridgeError::SurfaceGone(_)) => {
                debug!(%id, "surface gone, dropping reference");
                self.drop_surface().await;
            }
            Err(e) => {
                warn!(%id, error = %e, "notification push failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Event bus
    // ------------------------------------------------------------------

    fn emit(&self, event: CoreEvent) {
        // No subscribers is not a fault.
        let _ = self.bus.emit(event);
    }

    /// Republish the badge count after a committed mutation.
    async fn publish_badge(&self) {
        match self.store.len().await {
            Ok(count) => {
                self.emit(CoreEvent::Queue(QueueEvent::BadgeChanged { count }));
            }
            Err(e) => warn!(error = %e, "badge recount failed"),
        }
    }
}
