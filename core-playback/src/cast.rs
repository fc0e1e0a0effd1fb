//! Remote-cast session.
//!
//! The receiver is opaque: the session sends it commands and mirrors back
//! whatever state it reports, so the rest of the controller can treat
//! "casting" as just another place the media status comes from.

use std::sync::Arc;

use bridge_traits::cast::{CastCommand, CastEvent, CastSink};
use core_playlist::VideoEntry;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;

/// How long cast-related notices stay up.
const CAST_NOTICE_MS: u64 = 4000;

/// Mirrored state of the remote receiver.
#[derive(Debug, Clone, Default)]
pub struct RemoteStatus {
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f64,
    pub muted: bool,
    pub disconnected: bool,
}

/// An active remote-playback session.
///
/// Dropping the session stops mirroring; it does not tear the receiver
/// connection down, which stays the host's business.
pub struct CastSession {
    sink: Arc<dyn CastSink>,
    status: Arc<Mutex<RemoteStatus>>,
    loaded_index: Arc<Mutex<usize>>,
    forwarder: JoinHandle<()>,
}

impl CastSession {
    /// Begin mirroring the given sink onto the event bus.
    pub fn start(sink: Arc<dyn CastSink>, bus: EventBus) -> Self {
        let status = Arc::new(Mutex::new(RemoteStatus::default()));
        let loaded_index = Arc::new(Mutex::new(0usize));
        let mut events = sink.subscribe();
        let mirror = status.clone();
        let index_mirror = loaded_index.clone();

        let forwarder = tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    CastEvent::StateChanged { is_playing } => {
                        mirror.lock().is_playing = is_playing;
                        let event = if is_playing {
                            PlaybackEvent::Playing {
                                index: *index_mirror.lock(),
                            }
                        } else {
                            PlaybackEvent::Paused
                        };
                        let _ = bus.emit(CoreEvent::Playback(event));
                    }
                    CastEvent::TimeUpdated { current, duration } => {
                        {
                            let mut s = mirror.lock();
                            s.position_secs = current;
                            s.duration_secs = duration;
                        }
                        let _ = bus.emit(CoreEvent::Playback(PlaybackEvent::Progress {
                            position_secs: current,
                            duration_secs: Some(duration),
                        }));
                    }
                    CastEvent::VolumeChanged { level, muted } => {
                        {
                            let mut s = mirror.lock();
                            s.volume = level;
                            s.muted = muted;
                        }
                        let _ = bus.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged {
                            volume: level,
                            muted,
                        }));
                    }
                    CastEvent::Error { message } => {
                        let _ = bus.emit(CoreEvent::Playback(PlaybackEvent::Notice {
                            text: format!("Cast error: {message}"),
                            duration_ms: CAST_NOTICE_MS,
                        }));
                    }
                    CastEvent::Disconnected => {
                        mirror.lock().disconnected = true;
                        let _ = bus.emit(CoreEvent::Playback(PlaybackEvent::Notice {
                            text: "Cast session ended".to_string(),
                            duration_ms: CAST_NOTICE_MS,
                        }));
                        break;
                    }
                }
            }
            debug!("cast mirror stopped");
        });

        Self {
            sink,
            status,
            loaded_index,
            forwarder,
        }
    }

    /// Whether the receiver connection is live.
    pub fn is_active(&self) -> bool {
        self.sink.is_connected() && !self.status.lock().disconnected
    }

    pub fn status(&self) -> RemoteStatus {
        self.status.lock().clone()
    }

    /// Hand the given entry to the receiver and start remote playback.
    /// `index` is the entry's queue position, used when mirroring remote
    /// state back onto the bus.
    pub async fn load(&self, entry: &VideoEntry, index: usize) -> Result<()> {
        *self.loaded_index.lock() = index;
        let content_type = entry
            .content_type
            .clone()
            .unwrap_or_else(|| entry.stream_type.content_type_hint().to_string());
        self.sink
            .send(CastCommand::Load {
                media_url: entry.playback_url().to_string(),
                content_type,
                title: entry.title.clone(),
            })
            .await?;
        Ok(())
    }

    pub async fn play(&self) -> Result<()> {
        self.sink.send(CastCommand::Play).await?;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        self.sink.send(CastCommand::Pause).await?;
        Ok(())
    }

    pub async fn seek(&self, position_secs: f64) -> Result<()> {
        self.sink.send(CastCommand::Seek(position_secs)).await?;
        Ok(())
    }

    pub async fn set_volume(&self, level: Option<f64>, muted: Option<bool>) -> Result<()> {
        self.sink
            .send(CastCommand::SetVolume { level, muted })
            .await?;
        Ok(())
    }
}

impl Drop for CastSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
