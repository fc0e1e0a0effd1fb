//! The playback controller.
//!
//! Drives the single on-screen media element through the queue: load
//! protocol, stream-type dispatch, fault recovery, end-of-queue policy, and
//! volume/mute handling. Runs in the player surface context; queue state is
//! always read from and committed through the broker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::cast::CastSink;
use bridge_traits::media::{
    ElementEvent, EngineEvent, EngineFactory, MediaElement, MediaFault, StreamEngine,
};
use core_broker::BrokerHandle;
use core_classifier::StreamType;
use core_playlist::VideoEntry;
use core_runtime::config::RuntimeSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, RecvError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cast::CastSession;
use crate::engine::EngineSlot;
use crate::error::{classify_fault, FaultClass, PlaybackError, Result};
use crate::prefs::PlayerPrefs;
use crate::timers::TimerSlot;

/// User-facing player commands.
pub enum PlayerCommand {
    /// Load and play the entry at the given queue index.
    Load(usize),
    Next,
    Previous,
    TogglePlay,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    SetVolume(f64),
    ToggleMute,
    ToggleLoop,
    Stop,
    /// Reload the current entry after a failure or stop.
    Retry,
    ConnectCast(Arc<dyn CastSink>),
    DisconnectCast,
    /// Re-read the queue snapshot from the broker.
    RefreshQueue,
    /// The user touched the surface; keep the controls visible.
    Interact,
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing loaded yet.
    Idle,
    /// A load is under way for the current index.
    Loading,
    Playing,
    Paused,
    /// A recoverable fault was observed; a retry or recovery is in flight.
    ErrorRecoverable,
    /// The current entry failed for good.
    ErrorFatal,
    /// Playback halted (end of queue, or explicit stop). The queue is
    /// intact; `Retry` or `Load` resumes.
    Stopped,
}

/// Internal wakeups produced by expired timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    /// The auto-advance delay after a fatal failure elapsed.
    AdvanceNext,
    /// The current notice's display time elapsed.
    NoticeExpired,
    /// The controls idle delay elapsed.
    HideControls,
}

/// The playback controller.
///
/// One instance per player surface. Mutating methods take `&mut self`; the
/// [`run`](Self::run) driver serializes commands, element events, engine
/// events, and timer wakeups onto it.
pub struct PlaybackController {
    element: Arc<dyn MediaElement>,
    factory: Arc<dyn EngineFactory>,
    broker: BrokerHandle,
    prefs: PlayerPrefs,
    bus: EventBus,
    settings: RuntimeSettings,

    slot: EngineSlot,
    queue: Vec<VideoEntry>,
    current_index: usize,
    state: PlayerState,
    /// Incremented on every load attempt. Element and engine events are
    /// tagged with the generation current when they were observed; an older
    /// tag marks an event from a load this controller itself superseded,
    /// and it is dropped without any error handling. Shared with the
    /// element forwarder task, hence atomic.
    generation: Arc<AtomicU64>,
    recovery_attempted: bool,
    muted: bool,
    notice: Option<String>,
    controls_visible: bool,
    cast: Option<CastSession>,

    engine_tx: mpsc::UnboundedSender<(u64, EngineEvent)>,
    engine_events: mpsc::UnboundedReceiver<(u64, EngineEvent)>,
    element_events: mpsc::UnboundedReceiver<(u64, ElementEvent)>,
    nudge_tx: mpsc::UnboundedSender<Nudge>,
    nudges: mpsc::UnboundedReceiver<Nudge>,
    advance_timer: TimerSlot,
    notice_timer: TimerSlot,
    controls_timer: TimerSlot,
}

impl PlaybackController {
    pub fn new(
        element: Arc<dyn MediaElement>,
        factory: Arc<dyn EngineFactory>,
        broker: BrokerHandle,
        prefs: PlayerPrefs,
        bus: EventBus,
        settings: RuntimeSettings,
    ) -> Self {
        let (engine_tx, engine_events) = mpsc::unbounded_channel();
        let (nudge_tx, nudges) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let element_events = watch_element(element.as_ref(), generation.clone());
        Self {
            element,
            factory,
            broker,
            prefs,
            bus,
            settings,
            slot: EngineSlot::new(),
            queue: Vec::new(),
            current_index: 0,
            state: PlayerState::Idle,
            generation,
            recovery_attempted: false,
            muted: false,
            notice: None,
            controls_visible: true,
            cast: None,
            engine_tx,
            engine_events,
            element_events,
            nudge_tx,
            nudges,
            advance_timer: TimerSlot::new(),
            notice_timer: TimerSlot::new(),
            controls_timer: TimerSlot::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn queue(&self) -> &[VideoEntry] {
        &self.queue
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Generation of the most recent load attempt.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_casting(&self) -> bool {
        self.cast.as_ref().is_some_and(|c| c.is_active())
    }

    // ------------------------------------------------------------------
    // Driver
    // ------------------------------------------------------------------

    /// Serialize all inputs onto the controller until the command channel
    /// closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<PlayerCommand>) {
        let mut element_events =
            std::mem::replace(&mut self.element_events, mpsc::unbounded_channel().1);
        let mut engine_events =
            std::mem::replace(&mut self.engine_events, mpsc::unbounded_channel().1);
        let mut nudges = std::mem::replace(&mut self.nudges, mpsc::unbounded_channel().1);

        info!("playback controller started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Err(e) = self.on_command(command).await {
                            warn!(error = %e, "player command failed");
                        }
                    }
                    None => break,
                },
                Some((generation, event)) = element_events.recv() => {
                    self.on_element_event(generation, event).await;
                }
                Some((generation, event)) = engine_events.recv() => {
                    self.on_engine_event(generation, event).await;
                }
                Some(nudge) = nudges.recv() => self.on_nudge(nudge).await,
            }
        }
        self.slot.dispose().await;
        info!("playback controller stopped");
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub async fn on_command(&mut self, command: PlayerCommand) -> Result<()> {
        self.poke_controls();
        match command {
            PlayerCommand::Load(index) => self.load_index(index).await,
            PlayerCommand::Next => self.advance().await,
            PlayerCommand::Previous => self.previous().await,
            PlayerCommand::TogglePlay => self.toggle_play().await,
            PlayerCommand::Seek(position_secs) => self.seek(position_secs).await,
            PlayerCommand::SetVolume(volume) => self.set_volume(volume).await,
            PlayerCommand::ToggleMute => self.toggle_mute().await,
            PlayerCommand::ToggleLoop => {
                let enabled = !self.prefs.loop_enabled().await?;
                self.prefs.set_loop_enabled(enabled).await
            }
            PlayerCommand::Stop => self.stop().await,
            PlayerCommand::Retry => self.load_index(self.current_index).await,
            PlayerCommand::ConnectCast(sink) => self.connect_cast(sink).await,
            PlayerCommand::DisconnectCast => {
                self.cast = None;
                Ok(())
            }
            PlayerCommand::RefreshQueue => self.refresh_queue().await,
            PlayerCommand::Interact => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Load protocol
    // ------------------------------------------------------------------

    /// Load and start the entry at `index`.
    ///
    /// Order matters: previous engine disposed, element cleared, then the
    /// new source attached, and only after the load is actually under way
    /// is the index committed and the persisted volume re-applied.
    pub async fn load_index(&mut self, index: usize) -> Result<()> {
        self.refresh_queue().await?;
        if self.queue.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        let Some(entry) = self.queue.get(index).cloned() else {
            return Err(PlaybackError::IndexOutOfRange {
                index,
                len: self.queue.len(),
            });
        };

        // Bump the generation before any teardown so events the old source
        // already broadcast keep their old tag.
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.recovery_attempted = false;
        self.advance_timer.cancel();

        self.slot.dispose().await;
        self.element.clear_source().await?;

        self.state = PlayerState::Loading;
        self.emit(PlaybackEvent::Loading {
            index,
            url: entry.playback_url().to_string(),
        });

        if !self.start_entry(&entry).await? {
            self.fail_unsupported(index, &entry).await;
            return Ok(());
        }

        if let Err(e) = self.broker.set_current_index(index).await {
            // The load is already running; a failed commit only desyncs
            // other views until the next snapshot.
            warn!(error = %e, index, "index commit failed");
        }
        self.current_index = index;

        let volume = if self.muted {
            0.0
        } else {
            self.prefs.volume().await?
        };
        self.element.set_volume(volume).await?;
        self.emit(PlaybackEvent::VolumeChanged {
            volume,
            muted: self.muted,
        });
        Ok(())
    }

    /// Dispatch on the entry's stream family. Returns `false` when no
    /// playback path exists for it here.
    async fn start_entry(&mut self, entry: &VideoEntry) -> Result<bool> {
        match entry.stream_type {
            StreamType::Hls => {
                if self.factory.is_supported() {
                    let engine = self.factory.create(self.element.clone()).await?;
                    self.watch_engine(engine.as_ref());
                    self.slot.attach(engine).await;
                    if let Some(engine) = self.slot.engine() {
                        engine.load(entry.playback_url()).await?;
                    }
                    Ok(true)
                } else if self.element.can_play(entry.stream_type.content_type_hint()) {
                    // Native HLS (e.g. Safari-style hosts).
                    self.assign_to_element(entry).await?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            // Captured-stream entries cannot play: the capture feature is
            // disabled and there are no bytes behind them.
            StreamType::Mse => Ok(false),
            StreamType::Dash | StreamType::Mp4 | StreamType::Webm | StreamType::Unknown => {
                self.assign_to_element(entry).await?;
                Ok(true)
            }
        }
    }

    async fn assign_to_element(&mut self, entry: &VideoEntry) -> Result<()> {
        self.element.set_source(entry.playback_url()).await?;
        if self.settings.autoplay {
            self.element.play().await?;
        }
        Ok(())
    }

    /// Forward engine events into the controller, tagged with the load
    /// generation they belong to.
    fn watch_engine(&self, engine: &dyn StreamEngine) {
        let mut events = engine.subscribe();
        let tx = self.engine_tx.clone();
        let generation = self.generation();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if tx.send((generation, event)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    pub async fn on_element_event(&mut self, generation: u64, event: ElementEvent) {
        if generation != self.generation() {
            debug!(
                stale = generation,
                current = self.generation(),
                "dropping stale element event"
            );
            return;
        }
        match event {
            ElementEvent::Playing => {
                self.state = PlayerState::Playing;
                self.recovery_attempted = false;
                self.emit(PlaybackEvent::Playing {
                    index: self.current_index,
                });
            }
            ElementEvent::Paused => {
                if self.state == PlayerState::Playing {
                    self.state = PlayerState::Paused;
                    self.emit(PlaybackEvent::Paused);
                }
            }
            ElementEvent::TimeUpdate { position, duration } => {
                self.emit(PlaybackEvent::Progress {
                    position_secs: position.as_secs_f64(),
                    duration_secs: duration.map(|d| d.as_secs_f64()),
                });
            }
            ElementEvent::Ended => {
                self.emit(PlaybackEvent::Ended {
                    index: self.current_index,
                });
                if let Err(e) = self.advance().await {
                    warn!(error = %e, "advance after end failed");
                }
            }
            ElementEvent::Fault(fault) => self.on_fault(fault).await,
        }
    }

    pub async fn on_engine_event(&mut self, generation: u64, event: EngineEvent) {
        if generation != self.generation() {
            // Anything a superseded load reports — including its own abort —
            // is not an error.
            debug!(
                stale = generation,
                current = self.generation(),
                "dropping stale engine event"
            );
            return;
        }
        match event {
            EngineEvent::ManifestParsed => {
                if self.settings.autoplay {
                    if let Err(e) = self.element.play().await {
                        warn!(error = %e, "autoplay after manifest parse failed");
                    }
                }
            }
            EngineEvent::Fault(fault) => self.on_fault(fault).await,
        }
    }

    pub async fn on_nudge(&mut self, nudge: Nudge) {
        match nudge {
            Nudge::AdvanceNext => {
                if self.state == PlayerState::ErrorFatal {
                    if let Err(e) = self.advance().await {
                        warn!(error = %e, "auto-advance failed");
                    }
                }
            }
            Nudge::NoticeExpired => self.notice = None,
            Nudge::HideControls => self.controls_visible = false,
        }
    }

    // ------------------------------------------------------------------
    // Fault recovery
    // ------------------------------------------------------------------

    async fn on_fault(&mut self, fault: MediaFault) {
        let index = self.current_index;
        match classify_fault(&fault) {
            FaultClass::Transient => {
                debug!(%fault, "transient fault, restarting load");
                self.state = PlayerState::ErrorRecoverable;
                self.show_notice(format!("Connection trouble, retrying: {}", fault.detail));
                self.try_load(index).await;
            }
            FaultClass::Recoverable => {
                self.state = PlayerState::ErrorRecoverable;
                if !self.recovery_attempted && self.slot.is_attached() {
                    self.recovery_attempted = true;
                    let recovered = match self.slot.engine() {
                        Some(engine) => engine.recover_media().await.is_ok(),
                        None => false,
                    };
                    if recovered {
                        debug!(%fault, "in-place media recovery succeeded");
                        return;
                    }
                }
                // One attempt only; after that the fault is fatal.
                self.fail_fatal(index, fault.detail, true).await;
            }
            FaultClass::Fatal => self.fail_fatal(index, fault.detail, true).await,
        }
    }

    /// Mark the current entry failed: tear down, notify, and (for ordinary
    /// faults) schedule the delayed auto-advance. Unsupported-format
    /// failures skip the advance so the queue does not burn down unattended.
    async fn fail_fatal(&mut self, index: usize, detail: String, auto_advance: bool) {
        warn!(index, %detail, "fatal playback failure");
        self.state = PlayerState::ErrorFatal;
        self.slot.dispose().await;
        if let Err(e) = self.element.clear_source().await {
            warn!(error = %e, "element teardown failed");
        }
        self.emit(PlaybackEvent::FatalError {
            index,
            detail: detail.clone(),
        });
        self.show_notice(format!("Playback failed: {detail}"));

        if auto_advance {
            let tx = self.nudge_tx.clone();
            self.advance_timer
                .schedule(self.settings.advance_delay, async move {
                    let _ = tx.send(Nudge::AdvanceNext);
                });
        }
    }

    async fn fail_unsupported(&mut self, index: usize, entry: &VideoEntry) {
        let detail = match entry.stream_type {
            StreamType::Mse => "captured streams cannot be replayed".to_string(),
            other => format!("{other} playback is not supported here"),
        };
        self.fail_fatal(index, detail, false).await;
    }

    async fn try_load(&mut self, index: usize) {
        match self.load_index(index).await {
            Ok(()) => {}
            Err(PlaybackError::Bridge(e)) => {
                self.fail_fatal(index, e.to_string(), true).await;
            }
            Err(e) => warn!(error = %e, index, "load failed"),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Move to the next entry; at the end of the queue, wrap only when the
    /// durable loop toggle is on, otherwise stop.
    async fn advance(&mut self) -> Result<()> {
        self.refresh_queue().await?;
        if self.queue.is_empty() {
            return self.stop().await;
        }
        let next = self.current_index + 1;
        if next < self.queue.len() {
            self.try_load(next).await;
            return Ok(());
        }
        if self.prefs.loop_enabled().await? {
            self.try_load(0).await;
            return Ok(());
        }
        self.stop().await
    }

    async fn previous(&mut self) -> Result<()> {
        self.refresh_queue().await?;
        if self.queue.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        let target = if self.current_index > 0 {
            self.current_index - 1
        } else if self.prefs.loop_enabled().await? {
            self.queue.len() - 1
        } else {
            // At the first entry without loop, "previous" restarts the
            // current entry from the beginning.
            0
        };
        self.try_load(target).await;
        Ok(())
    }

    async fn toggle_play(&mut self) -> Result<()> {
        if let Some(cast) = self.cast.as_ref().filter(|c| c.is_active()) {
            if cast.status().is_playing {
                cast.pause().await?;
            } else {
                cast.play().await?;
            }
            return Ok(());
        }
        match self.state {
            PlayerState::Playing => self.element.pause().await?,
            _ => self.element.play().await?,
        }
        Ok(())
    }

    async fn seek(&mut self, position_secs: f64) -> Result<()> {
        let position_secs = position_secs.max(0.0);
        if let Some(cast) = self.cast.as_ref().filter(|c| c.is_active()) {
            cast.seek(position_secs).await?;
            return Ok(());
        }
        self.element
            .seek(Duration::from_secs_f64(position_secs))
            .await?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.advance_timer.cancel();
        self.slot.dispose().await;
        self.element.pause().await?;
        self.element.clear_source().await?;
        self.state = PlayerState::Stopped;
        self.emit(PlaybackEvent::Stopped);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Volume and mute
    // ------------------------------------------------------------------

    pub async fn set_volume(&mut self, volume: f64) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        if volume > 0.0 {
            self.muted = false;
        }
        if let Some(cast) = self.cast.as_ref().filter(|c| c.is_active()) {
            cast.set_volume(Some(volume), Some(self.muted)).await?;
        } else {
            self.element.set_volume(volume).await?;
        }
        self.prefs.set_volume(volume).await?;
        self.emit(PlaybackEvent::VolumeChanged {
            volume,
            muted: self.muted,
        });
        Ok(())
    }

    /// Mute snapshots the pre-mute level; unmute restores exactly it.
    pub async fn toggle_mute(&mut self) -> Result<()> {
        if self.muted {
            self.muted = false;
            let restored = self.prefs.previous_volume().await?;
            return self.set_volume(restored).await;
        }

        let level = self.prefs.volume().await?;
        self.prefs.set_previous_volume(level).await?;
        self.muted = true;
        if let Some(cast) = self.cast.as_ref().filter(|c| c.is_active()) {
            cast.set_volume(None, Some(true)).await?;
        } else {
            self.element.set_volume(0.0).await?;
        }
        self.prefs.set_volume(0.0).await?;
        self.emit(PlaybackEvent::VolumeChanged {
            volume: 0.0,
            muted: true,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Casting
    // ------------------------------------------------------------------

    /// Adopt a remote receiver: local playback pauses and the current entry
    /// is handed over.
    pub async fn connect_cast(&mut self, sink: Arc<dyn CastSink>) -> Result<()> {
        if let Err(e) = self.element.pause().await {
            warn!(error = %e, "could not pause local element for cast");
        }
        let session = CastSession::start(sink, self.bus.clone());
        if let Some(entry) = self.queue.get(self.current_index).cloned() {
            session.load(&entry, self.current_index).await?;
        }
        self.show_notice("Casting to remote receiver".to_string());
        self.cast = Some(session);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------

    async fn refresh_queue(&mut self) -> Result<()> {
        let snapshot = self.broker.snapshot(None).await?;
        self.queue = snapshot.entries;
        self.current_index = snapshot
            .current_index
            .min(self.queue.len().saturating_sub(1));
        Ok(())
    }

    fn show_notice(&mut self, text: String) {
        let duration = self.settings.notice_duration;
        self.notice = Some(text.clone());
        self.emit(PlaybackEvent::Notice {
            text,
            duration_ms: duration.as_millis() as u64,
        });
        let tx = self.nudge_tx.clone();
        self.notice_timer.schedule(duration, async move {
            let _ = tx.send(Nudge::NoticeExpired);
        });
    }

    fn poke_controls(&mut self) {
        self.controls_visible = true;
        let tx = self.nudge_tx.clone();
        self.controls_timer
            .schedule(self.settings.controls_idle_hide, async move {
                let _ = tx.send(Nudge::HideControls);
            });
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.bus.emit(CoreEvent::Playback(event));
    }
}

/// Forward element events into the controller, each tagged with the load
/// generation current at the moment it was observed. The element outlives
/// every load, so unlike engines it gets one long-lived forwarder reading
/// the live generation instead of a per-load snapshot.
fn watch_element(
    element: &dyn MediaElement,
    generation: Arc<AtomicU64>,
) -> mpsc::UnboundedReceiver<(u64, ElementEvent)> {
    let mut events = element.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if tx.send((generation.load(Ordering::Acquire), event)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "element event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    rx
}
