//! Playback controller - the playback state machine
//!
//! Owns the [`Session`] and the media element. User commands and element
//! events go in; store actions and asynchronous [`Task`]s come out and are
//! drained by whoever drives the controller (usually
//! [`PlayerRuntime`](crate::PlayerRuntime)).
//!
//! ```text
//!            toggle / next / prev / select
//!   idle ──────────────────────────────────▶ loading
//!    ▲                                          │ play event
//!    │ fault / load error                       ▼
//!    └──────────── paused ◀──── pause ────── playing
//!                    │                          ▲
//!                    └──────── toggle ──────────┘ (via loading)
//! ```
//!
//! Asynchronous work is stamped with a [`Ticket`]. Any command that changes
//! what should be playing issues a fresh ticket, so completions of older work
//! are discarded instead of starting the wrong track.

use crate::{
    bridge::{StoreAction, StoreSnapshot},
    error::{PlaybackError, Result},
    media::{MediaElement, MediaEvent},
    resolver::{resolve_source, PlaybackSource, Resolution, Ticket},
    session::Session,
    types::{AdvanceCause, PlaybackConfig, PlaybackPhase, RepeatMode},
};
use orbit_core::{LocalFile, Track, TrackId};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Asynchronous work requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Call [`PlaybackController::start_delay_elapsed`] after `delay`
    StartAfter { ticket: Ticket, delay: Duration },

    /// Decode `file` and report through [`PlaybackController::source_resolved`]
    Decode {
        ticket: Ticket,
        track_id: TrackId,
        file: LocalFile,
    },
}

impl Task {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::StartAfter { ticket, .. } | Self::Decode { ticket, .. } => *ticket,
        }
    }
}

/// Playback state machine
pub struct PlaybackController {
    config: PlaybackConfig,
    element: Box<dyn MediaElement>,
    session: Session,
    phase: PlaybackPhase,

    // Latest generation; anything older is stale
    ticket: Ticket,

    // Decode in flight for the current track
    awaiting: Option<(Ticket, TrackId)>,

    // Track whose source the element currently holds
    loaded: Option<TrackId>,

    pending_actions: Vec<StoreAction>,
    pending_tasks: Vec<Task>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("phase", &self.phase)
            .field("current", &self.session.current_index())
            .field("repeat", &self.session.repeat())
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// Create a controller driving `element`
    ///
    /// Sets the element volume from the config.
    pub fn new(config: PlaybackConfig, element: impl MediaElement + 'static) -> Self {
        let mut element: Box<dyn MediaElement> = Box::new(element);
        element.set_volume(config.volume.clamp(0.0, 1.0));

        Self {
            session: Session::new(config.repeat),
            config,
            element,
            phase: PlaybackPhase::Idle,
            ticket: Ticket::default(),
            awaiting: None,
            loaded: None,
            pending_actions: Vec::new(),
            pending_tasks: Vec::new(),
        }
    }

    // ===== Transport =====

    /// Play if paused or ended, pause if playing
    ///
    /// Starting is deferred by the configured start delay; a [`Task::StartAfter`]
    /// is queued and the controller waits in `Loading`.
    pub fn toggle_play(&mut self) {
        if self.session.playlist().is_empty() {
            return;
        }

        if self.element.src().is_none() {
            self.select_index(0);
        }

        if self.element.is_paused() || self.element.is_ended() {
            let ticket = self.supersede();
            self.phase = PlaybackPhase::Loading;
            self.pending_tasks.push(Task::StartAfter {
                ticket,
                delay: self.config.start_delay(),
            });
        } else {
            self.supersede();
            self.element.pause();
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Pause playback and drop any pending start
    pub fn pause(&mut self) {
        self.supersede();
        if !self.element.is_paused() {
            self.element.pause();
        }
        self.settle_phase();
    }

    /// Pause and rewind the current track
    pub fn stop(&mut self) {
        self.supersede();
        self.element.pause();
        self.element.seek(Duration::ZERO);
        self.settle_phase();
    }

    /// User skip forward
    pub fn next_track(&mut self) {
        self.load_next(AdvanceCause::User);
    }

    /// User skip back
    ///
    /// Restarts the current track if it has played past the scrub threshold,
    /// otherwise moves to the previous slot.
    pub fn previous_track(&mut self) {
        if self.session.playlist().is_empty() {
            return;
        }

        let elapsed = self.element.current_time();
        if elapsed >= self.config.scrub_threshold() {
            debug!(elapsed_ms = elapsed.as_millis(), "Restarting current track");
            self.element.seek(Duration::ZERO);
            return;
        }

        self.load_previous();
    }

    /// Advance to the next slot
    ///
    /// Past the last slot the index wraps to 0. The wrapped track only plays
    /// when the user asked for it or the whole playlist repeats.
    pub fn load_next(&mut self, cause: AdvanceCause) {
        let Some(current) = self.session.current_index() else {
            return;
        };

        let next = current + 1;
        if next >= self.session.playlist().len() {
            self.select_index(0);
            if cause == AdvanceCause::User || self.session.repeat() == RepeatMode::Context {
                self.play_current();
            } else {
                debug!("Reached end of playlist");
                self.supersede();
                self.settle_phase();
            }
        } else {
            self.select_index(next);
            self.play_current();
        }
    }

    /// Move to the previous slot (staying on slot 0) and play
    pub fn load_previous(&mut self) {
        let Some(current) = self.session.current_index() else {
            return;
        };

        let previous = current.saturating_sub(1);
        if previous == current {
            self.element.seek(Duration::ZERO);
        }
        self.select_index(previous);
        self.play_current();
    }

    /// Select a slot and play it
    pub fn set_current_track(&mut self, index: usize) -> Result<()> {
        if self.session.select(index)? {
            self.emit(StoreAction::SetCurrentTrack { track_index: index });
        }
        self.play_current();
        Ok(())
    }

    /// Cycle the repeat mode: off → track → context → off
    pub fn toggle_repeat(&mut self) -> RepeatMode {
        let repeat = self.session.cycle_repeat();
        info!(%repeat, "Repeat mode changed");
        self.emit(StoreAction::ToggleRepeat { repeat });
        repeat
    }

    // ===== Playlist =====

    /// Add tracks to the catalog and the end of the playlist
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }

        let added = self.session.add_tracks(&tracks)?;
        info!(added, total = self.session.playlist().len(), "Added tracks");
        self.emit(StoreAction::AddTracks { tracks });
        Ok(())
    }

    /// Remove one playlist slot
    ///
    /// When the current slot goes, the track sliding into its place takes over:
    /// it plays if playback was active, otherwise it is only selected.
    pub fn remove_track(&mut self, index: usize) -> Result<()> {
        let len = self.session.playlist().len();
        let removal = self
            .session
            .remove(index)
            .ok_or(PlaybackError::IndexOutOfBounds { index, len })?;
        self.emit(StoreAction::RemoveTrack { track_index: index });

        if !removal.was_current {
            return Ok(());
        }

        if self.session.playlist().is_empty() {
            self.halt();
        } else if self.is_active() {
            self.play_current();
        } else {
            self.supersede();
        }
        Ok(())
    }

    /// Move the slot at `from` to `to`, keeping the current track current
    ///
    /// `None` or out-of-range positions leave everything untouched.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        if !self.session.reorder(from, to) {
            return false;
        }

        let playlist = self.session.playlist().entries().to_vec();
        let current_track = self.session.current_index();
        debug!(from, ?to, ?current_track, "Reordered playlist");
        self.emit(StoreAction::ArrangeTracks {
            playlist,
            current_track,
        });
        true
    }

    /// Adopt store state pushed from outside
    ///
    /// An invalid snapshot is rejected and changes nothing. If the current
    /// track changed while playback was active, the new one starts.
    pub fn apply_snapshot(&mut self, snapshot: StoreSnapshot) -> Result<()> {
        let session = Session::from_snapshot(snapshot)?;
        let previous = self.session.playlist().current_id().cloned();
        self.session = session;

        if self.session.playlist().current_id() == previous.as_ref() {
            return Ok(());
        }

        if self.session.playlist().is_empty() {
            self.halt();
        } else if self.is_active() {
            self.play_current();
        } else {
            self.supersede();
        }
        Ok(())
    }

    // ===== Element events =====

    /// Feed a lifecycle event from the media element
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadStart => {
                self.phase = PlaybackPhase::Loading;
                self.emit(StoreAction::LoadingStarted);
            }
            MediaEvent::CanPlayThrough => self.emit(StoreAction::LoadingFinished),
            MediaEvent::Play => {
                self.phase = PlaybackPhase::Playing;
                self.emit(StoreAction::Playing);
            }
            MediaEvent::Pause => {
                // Idle after a halt and Loading during a source change both stand
                if self.phase == PlaybackPhase::Playing {
                    self.phase = PlaybackPhase::Paused;
                }
                self.emit(StoreAction::Paused);
            }
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Abort if self.phase == PlaybackPhase::Loading => {
                // Assigning a new src aborts the previous load
                debug!("Ignoring abort during source change");
            }
            fault @ (MediaEvent::Stalled | MediaEvent::Abort | MediaEvent::Error { .. }) => {
                self.fault(&fault);
            }
        }
    }

    fn on_ended(&mut self) {
        let replaced = self.loaded.as_ref() != self.session.playlist().current_id();
        if replaced || self.awaiting.is_some() {
            debug!(loaded = ?self.loaded, "Ignoring end of a replaced source");
            return;
        }

        if self.session.repeat() == RepeatMode::Track {
            debug!("Repeating current track");
            self.supersede();
            self.phase = PlaybackPhase::Loading;
            self.element.seek(Duration::ZERO);
            self.element.play();
        } else {
            self.load_next(AdvanceCause::Auto);
        }
    }

    fn fault(&mut self, event: &MediaEvent) {
        let message = event.describe();
        warn!(%message, current = ?self.session.current_index(), "Media element fault");
        self.supersede();
        if !self.element.is_paused() {
            self.element.pause();
        }
        self.loaded = None;
        self.phase = PlaybackPhase::Idle;
        self.emit(StoreAction::PlaybackFailed { message });
    }

    // ===== Async completions =====

    /// The start delay scheduled by [`toggle_play`](Self::toggle_play) ran out
    pub fn start_delay_elapsed(&mut self, ticket: Ticket) {
        if ticket != self.ticket {
            debug!(%ticket, latest = %self.ticket, "Discarding superseded start");
            return;
        }

        let resumable = self.loaded.is_some()
            && self.loaded.as_ref() == self.session.playlist().current_id()
            && !self.element.is_ended();
        if resumable {
            self.element.play();
        } else {
            self.play_current();
        }
    }

    /// A decode requested through [`Task::Decode`] finished
    ///
    /// Stale completions are dropped. A failed decode puts the controller
    /// back to `Idle`, emits a load error and is returned to the caller.
    pub fn source_resolved(
        &mut self,
        ticket: Ticket,
        result: Result<PlaybackSource>,
    ) -> Result<()> {
        let track_id = match self.awaiting.take() {
            Some((expected, track_id)) if expected == ticket => track_id,
            other => {
                self.awaiting = other;
                debug!(%ticket, "Discarding superseded source resolution");
                return Ok(());
            }
        };

        if self.session.playlist().current_id() != Some(&track_id) {
            debug!(track = %track_id, "Resolved track is no longer current");
            return Ok(());
        }

        match result {
            Ok(source) => {
                self.element.set_src(&source.url);
                self.loaded = Some(track_id);
                self.element.play();
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                error!(track = %track_id, %message, "Failed to decode track");
                self.phase = PlaybackPhase::Idle;
                self.emit(StoreAction::LoadFailed {
                    track_id: track_id.clone(),
                    message: message.clone(),
                });
                Err(PlaybackError::Decode {
                    track: track_id,
                    message,
                })
            }
        }
    }

    // ===== Queries =====

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn repeat(&self) -> RepeatMode {
        self.session.repeat()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.current_index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.current_track()
    }

    pub fn playlist(&self) -> &[TrackId] {
        self.session.playlist().entries()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Elapsed position reported by the element
    pub fn current_time(&self) -> Duration {
        self.element.current_time()
    }

    /// Authoritative state in store shape
    pub fn snapshot(&self) -> StoreSnapshot {
        self.session.snapshot()
    }

    /// Latest ticket issued
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Take the store actions emitted since the last call
    pub fn drain_actions(&mut self) -> Vec<StoreAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Take the tasks requested since the last call
    pub fn drain_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.pending_tasks)
    }

    // ===== Internal =====

    /// Resolve the current track and start it
    fn play_current(&mut self) {
        let ticket = self.supersede();

        let Some(track) = self.session.current_track() else {
            self.settle_phase();
            return;
        };
        let track_id = track.id.clone();
        info!(track = %track_id, title = %track.title, artist = %track.artist, "Loading track");
        let resolution = resolve_source(track, self.element.src().as_deref());

        match resolution {
            Resolution::Decode(file) => {
                // The old source must not run on while the new one decodes
                if !self.element.is_paused() {
                    self.element.pause();
                }
                self.loaded = None;
                self.phase = PlaybackPhase::Loading;
                self.awaiting = Some((ticket, track_id.clone()));
                self.pending_tasks.push(Task::Decode {
                    ticket,
                    track_id,
                    file,
                });
            }
            Resolution::Assign(url) => {
                self.phase = PlaybackPhase::Loading;
                self.element.set_src(&url);
                self.loaded = Some(track_id);
                self.element.play();
            }
            Resolution::AlreadyLoaded => {
                if self.element.is_paused() {
                    self.phase = PlaybackPhase::Loading;
                }
                self.loaded = Some(track_id);
                self.element.play();
            }
        }
    }

    /// Select a slot, emitting `SetCurrentTrack` only when the index moved
    fn select_index(&mut self, index: usize) {
        match self.session.select(index) {
            Ok(true) => self.emit(StoreAction::SetCurrentTrack { track_index: index }),
            Ok(false) => {}
            Err(err) => warn!(%err, "Ignoring selection"),
        }
    }

    /// Invalidate outstanding work and return the new ticket
    fn supersede(&mut self) -> Ticket {
        self.ticket = self.ticket.next();
        self.awaiting = None;
        self.ticket
    }

    /// Stop everything; used when the playlist runs empty
    fn halt(&mut self) {
        self.supersede();
        if !self.element.is_paused() {
            self.element.pause();
        }
        self.loaded = None;
        self.phase = PlaybackPhase::Idle;
    }

    /// Phase after stopping without a fault
    fn settle_phase(&mut self) {
        self.phase = if self.element.src().is_some() {
            PlaybackPhase::Paused
        } else {
            PlaybackPhase::Idle
        };
    }

    fn is_active(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Playing | PlaybackPhase::Loading)
    }

    fn emit(&mut self, action: StoreAction) {
        self.pending_actions.push(action);
    }
}
