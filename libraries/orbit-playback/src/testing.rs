//! Test doubles
//!
//! [`MockElement`] records every command it receives and keeps a tiny model
//! of an audio element's state. Clones share that state, so a test can keep
//! one handle while the controller owns another.
//!
//! With a [`MediaSink`] attached it also reports lifecycle events the way a
//! browser element does: `loadstart` on a new source (after `pause` if it
//! was playing), `canplaythrough` and `play` when it starts, `pause` when it
//! stops.

use crate::media::{MediaElement, MediaEvent};
use crate::runtime::MediaSink;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Command received by a [`MockElement`]
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    Play,
    Pause,
    Seek(Duration),
    SetSrc(String),
    SetVolume(f32),
}

#[derive(Debug)]
struct MockState {
    src: Option<String>,
    paused: bool,
    ended: bool,
    fresh: bool,
    time: Duration,
    volume: f32,
    calls: Vec<ElementCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            src: None,
            paused: true,
            ended: false,
            fresh: false,
            time: Duration::ZERO,
            volume: 1.0,
            calls: Vec::new(),
        }
    }
}

/// Recording media element
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    state: Arc<Mutex<MockState>>,
    sink: Option<MediaSink>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report lifecycle events to `sink`
    #[must_use]
    pub fn with_sink(mut self, sink: MediaSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: impl IntoIterator<Item = MediaEvent>) {
        if let Some(sink) = &self.sink {
            for event in events {
                sink.emit(event);
            }
        }
    }

    /// Commands received so far
    pub fn calls(&self) -> Vec<ElementCall> {
        self.state().calls.clone()
    }

    /// Forget recorded commands
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of `play()` calls so far
    pub fn play_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == ElementCall::Play)
            .count()
    }

    /// Sources assigned so far, oldest first
    pub fn assigned_sources(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                ElementCall::SetSrc(src) => Some(src.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn volume(&self) -> f32 {
        self.state().volume
    }

    /// Move the play head without recording a seek
    pub fn set_current_time(&self, time: Duration) {
        self.state().time = time;
    }

    /// Pretend the source played to its end
    pub fn finish(&self) {
        let was_playing = {
            let mut state = self.state();
            let was_playing = !state.paused;
            state.ended = true;
            state.paused = true;
            was_playing
        };
        if was_playing {
            self.emit([MediaEvent::Pause]);
        }
        self.emit([MediaEvent::Ended]);
    }
}

impl MediaElement for MockElement {
    fn play(&mut self) {
        let events = {
            let mut state = self.state();
            state.calls.push(ElementCall::Play);
            if state.src.is_none() || !state.paused {
                Vec::new()
            } else {
                if state.ended {
                    state.ended = false;
                    state.time = Duration::ZERO;
                }
                state.paused = false;
                let mut events = Vec::new();
                if std::mem::take(&mut state.fresh) {
                    events.push(MediaEvent::CanPlayThrough);
                }
                events.push(MediaEvent::Play);
                events
            }
        };
        self.emit(events);
    }

    fn pause(&mut self) {
        let was_playing = {
            let mut state = self.state();
            state.calls.push(ElementCall::Pause);
            let was_playing = !state.paused;
            state.paused = true;
            was_playing
        };
        if was_playing {
            self.emit([MediaEvent::Pause]);
        }
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    fn is_ended(&self) -> bool {
        self.state().ended
    }

    fn current_time(&self) -> Duration {
        self.state().time
    }

    fn seek(&mut self, position: Duration) {
        let mut state = self.state();
        state.calls.push(ElementCall::Seek(position));
        state.time = position;
        state.ended = false;
    }

    fn src(&self) -> Option<String> {
        self.state().src.clone()
    }

    fn set_src(&mut self, src: &str) {
        let was_playing = {
            let mut state = self.state();
            state.calls.push(ElementCall::SetSrc(src.to_string()));
            let was_playing = !state.paused;
            state.src = Some(src.to_string());
            state.paused = true;
            state.ended = false;
            state.fresh = true;
            state.time = Duration::ZERO;
            was_playing
        };
        if was_playing {
            self.emit([MediaEvent::Pause]);
        }
        self.emit([MediaEvent::LoadStart]);
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state();
        state.calls.push(ElementCall::SetVolume(volume));
        state.volume = volume;
    }
}
