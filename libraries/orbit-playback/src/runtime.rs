//! Async driver for the playback controller
//!
//! [`PlayerRuntime`] owns a [`PlaybackController`] and runs it on a single
//! tokio task. Everything that can change state (user commands, element
//! events, timer expiry, decode completion) arrives on one channel, so the
//! controller sees inputs strictly in arrival order.
//!
//! Store actions are published on a broadcast channel after every input.
//!
//! Element events are stamped with the source they were raised for. An event
//! that was still queued when the controller assigned a newer source is
//! dropped before it reaches the controller.

use crate::{
    bridge::{StoreAction, StoreSnapshot},
    controller::{PlaybackController, Task},
    error::{PlaybackError, Result},
    media::{MediaElement, MediaEvent},
    resolver::{FileDecoder, PlaybackSource, Ticket},
    types::{PlaybackConfig, PlaybackPhase, RepeatMode},
};
use orbit_core::Track;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the store action broadcast
const ACTION_CHANNEL_CAPACITY: usize = 256;

/// User-level commands accepted by the runtime
#[derive(Debug)]
pub enum Command {
    TogglePlay,
    Pause,
    Stop,
    Next,
    Previous,
    ToggleRepeat,
    Reorder { from: usize, to: Option<usize> },
    Remove(usize),
    Select(usize),
    AddTracks(Vec<Track>),
    ApplySnapshot(Box<StoreSnapshot>),
    Inspect(oneshot::Sender<PlayerStatus>),
    Shutdown,
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub phase: PlaybackPhase,
    pub repeat: RepeatMode,
    pub current_index: Option<usize>,
    pub current_track: Option<Track>,
    pub position: Duration,
    pub snapshot: StoreSnapshot,
}

impl PlayerStatus {
    fn of(controller: &PlaybackController) -> Self {
        Self {
            phase: controller.phase(),
            repeat: controller.repeat(),
            current_index: controller.current_index(),
            current_track: controller.current_track().cloned(),
            position: controller.current_time(),
            snapshot: controller.snapshot(),
        }
    }
}

#[derive(Debug)]
enum RuntimeInput {
    Command(Command),
    Media { source: u64, event: MediaEvent },
    StartDelayElapsed(Ticket),
    SourceResolved {
        ticket: Ticket,
        result: Result<PlaybackSource>,
    },
}

/// Where a media element reports its lifecycle events
///
/// Holds a weak reference to the runtime's inbox, so an element owned by the
/// controller does not keep the runtime alive.
///
/// Events are stamped with the source assigned when they are emitted, or
/// with the source the sink was pinned to by [`MediaSink::for_current_source`].
#[derive(Debug, Clone)]
pub struct MediaSink {
    inputs: mpsc::WeakUnboundedSender<RuntimeInput>,
    source: Arc<AtomicU64>,
    pinned: Option<u64>,
}

impl MediaSink {
    /// Report an event; returns `false` once the runtime is gone
    pub fn emit(&self, event: MediaEvent) -> bool {
        let source = self
            .pinned
            .unwrap_or_else(|| self.source.load(Ordering::Acquire));
        self.inputs
            .upgrade()
            .is_some_and(|tx| tx.send(RuntimeInput::Media { source, event }).is_ok())
    }

    /// Sink whose events always belong to the source assigned right now
    ///
    /// Deferred work (an end-of-track timer, say) should report through one
    /// of these, so it goes stale once the element switches sources.
    #[must_use]
    pub fn for_current_source(&self) -> Self {
        Self {
            inputs: self.inputs.clone(),
            source: Arc::clone(&self.source),
            pinned: Some(self.source.load(Ordering::Acquire)),
        }
    }
}

/// Element wrapper counting source assignments
struct SourceStamped<E> {
    inner: E,
    source: Arc<AtomicU64>,
}

impl<E: MediaElement> MediaElement for SourceStamped<E> {
    fn play(&mut self) {
        self.inner.play();
    }

    fn pause(&mut self) {
        self.inner.pause();
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn is_ended(&self) -> bool {
        self.inner.is_ended()
    }

    fn current_time(&self) -> Duration {
        self.inner.current_time()
    }

    fn seek(&mut self, position: Duration) {
        self.inner.seek(position);
    }

    fn src(&self) -> Option<String> {
        self.inner.src()
    }

    fn set_src(&mut self, src: &str) {
        self.source.fetch_add(1, Ordering::AcqRel);
        self.inner.set_src(src);
    }

    fn set_volume(&mut self, volume: f32) {
        self.inner.set_volume(volume);
    }
}

/// Cloneable handle for talking to a running [`PlayerRuntime`]
///
/// The runtime stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    inputs: mpsc::UnboundedSender<RuntimeInput>,
    actions: broadcast::Sender<StoreAction>,
    source: Arc<AtomicU64>,
}

impl RuntimeHandle {
    /// Queue a command
    pub fn send(&self, command: Command) -> Result<()> {
        self.inputs
            .send(RuntimeInput::Command(command))
            .map_err(|_| PlaybackError::RuntimeClosed)
    }

    /// Report a media element event for the source assigned right now
    pub fn media_event(&self, event: MediaEvent) -> Result<()> {
        let source = self.source.load(Ordering::Acquire);
        self.inputs
            .send(RuntimeInput::Media { source, event })
            .map_err(|_| PlaybackError::RuntimeClosed)
    }

    /// Receive store actions emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreAction> {
        self.actions.subscribe()
    }

    /// Sink for an element that reports its own events
    pub fn media_sink(&self) -> MediaSink {
        MediaSink {
            inputs: self.inputs.downgrade(),
            source: Arc::clone(&self.source),
            pinned: None,
        }
    }

    /// Ask the controller for its current state
    pub async fn status(&self) -> Result<PlayerStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Inspect(tx))?;
        rx.await.map_err(|_| PlaybackError::RuntimeClosed)
    }
}

/// Event loop around a [`PlaybackController`]
pub struct PlayerRuntime {
    controller: PlaybackController,
    decoder: Arc<dyn FileDecoder>,
    inputs: mpsc::UnboundedReceiver<RuntimeInput>,
    loopback: mpsc::WeakUnboundedSender<RuntimeInput>,
    actions: broadcast::Sender<StoreAction>,
    source: Arc<AtomicU64>,
    decode_task: Option<JoinHandle<()>>,
}

impl PlayerRuntime {
    /// Build a runtime and its handle
    ///
    /// `make_element` receives the sink the element should report its events
    /// to.
    pub fn new<E, F>(
        config: PlaybackConfig,
        decoder: impl FileDecoder + 'static,
        make_element: F,
    ) -> (Self, RuntimeHandle)
    where
        E: MediaElement + 'static,
        F: FnOnce(MediaSink) -> E,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        let source = Arc::new(AtomicU64::new(0));
        let handle = RuntimeHandle {
            inputs: tx,
            actions: actions.clone(),
            source: Arc::clone(&source),
        };

        let element = SourceStamped {
            inner: make_element(handle.media_sink()),
            source: Arc::clone(&source),
        };
        let runtime = Self {
            controller: PlaybackController::new(config, element),
            decoder: Arc::new(decoder),
            inputs: rx,
            loopback: handle.inputs.downgrade(),
            actions,
            source,
            decode_task: None,
        };
        (runtime, handle)
    }

    /// Process inputs until shutdown or until every handle is dropped
    ///
    /// Returns the controller so callers can inspect the final state.
    pub async fn run(mut self) -> PlaybackController {
        info!("Playback runtime started");

        while let Some(input) = self.inputs.recv().await {
            match input {
                RuntimeInput::Command(Command::Shutdown) => break,
                RuntimeInput::Command(command) => self.execute(command),
                RuntimeInput::Media { source, event } => {
                    let current = self.source.load(Ordering::Acquire);
                    if source == current {
                        self.controller.handle_media_event(event);
                    } else {
                        debug!(?event, source, current, "Dropping event for a replaced source");
                    }
                }
                RuntimeInput::StartDelayElapsed(ticket) => {
                    self.controller.start_delay_elapsed(ticket);
                }
                RuntimeInput::SourceResolved { ticket, result } => {
                    if let Err(err) = self.controller.source_resolved(ticket, result) {
                        debug!(%err, "Source resolution failed");
                    }
                }
            }
            self.flush();
        }

        if let Some(task) = self.decode_task.take() {
            task.abort();
        }
        info!("Playback runtime stopped");
        self.controller
    }

    fn execute(&mut self, command: Command) {
        let controller = &mut self.controller;
        let result = match command {
            Command::TogglePlay => {
                controller.toggle_play();
                Ok(())
            }
            Command::Pause => {
                controller.pause();
                Ok(())
            }
            Command::Stop => {
                controller.stop();
                Ok(())
            }
            Command::Next => {
                controller.next_track();
                Ok(())
            }
            Command::Previous => {
                controller.previous_track();
                Ok(())
            }
            Command::ToggleRepeat => {
                controller.toggle_repeat();
                Ok(())
            }
            Command::Reorder { from, to } => {
                controller.reorder(from, to);
                Ok(())
            }
            Command::Remove(index) => controller.remove_track(index),
            Command::Select(index) => controller.set_current_track(index),
            Command::AddTracks(tracks) => controller.add_tracks(tracks),
            Command::ApplySnapshot(snapshot) => controller.apply_snapshot(*snapshot),
            Command::Inspect(reply) => {
                // Receiver may have given up
                let _ = reply.send(PlayerStatus::of(controller));
                Ok(())
            }
            Command::Shutdown => Ok(()),
        };

        if let Err(err) = result {
            warn!(%err, "Command rejected");
        }
    }

    /// Start requested tasks and publish emitted actions
    fn flush(&mut self) {
        for task in self.controller.drain_tasks() {
            self.spawn(task);
        }
        for action in self.controller.drain_actions() {
            // No subscribers is fine
            let _ = self.actions.send(action);
        }
    }

    fn spawn(&mut self, task: Task) {
        let loopback = self.loopback.clone();
        match task {
            Task::StartAfter { ticket, delay } => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(tx) = loopback.upgrade() {
                        let _ = tx.send(RuntimeInput::StartDelayElapsed(ticket));
                    }
                });
            }
            Task::Decode {
                ticket,
                track_id,
                file,
            } => {
                if let Some(stale) = self.decode_task.take() {
                    stale.abort();
                }
                debug!(
                    track = %track_id,
                    %ticket,
                    path = %file.path().display(),
                    "Decoding local file"
                );

                let decoder = Arc::clone(&self.decoder);
                self.decode_task = Some(tokio::spawn(async move {
                    let result = decoder.decode(&file).await;
                    if let Some(tx) = loopback.upgrade() {
                        let _ = tx.send(RuntimeInput::SourceResolved { ticket, result });
                    }
                }));
            }
        }
    }
}
