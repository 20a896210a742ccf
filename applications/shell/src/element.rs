//! Clock-driven stand-in for an audio element
//!
//! [`SimulatedElement`] plays nothing. It keeps a play head that advances
//! with the tokio clock and reports the same lifecycle events a browser
//! element would, including `pause` + `ended` when a source runs out.

use orbit_playback::{MediaElement, MediaEvent, MediaSink};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Length assumed for sources without a known duration
pub const DEFAULT_TRACK_LENGTH: Duration = Duration::from_secs(180);

#[derive(Debug)]
struct Clock {
    src: Option<String>,
    length: Duration,
    paused: bool,
    ended: bool,
    fresh: bool,
    /// Position when the clock was last stopped or moved
    offset: Duration,
    /// Set while playing
    started: Option<Instant>,
    /// Bumped whenever a scheduled end becomes invalid
    generation: u64,
}

impl Clock {
    fn position(&self) -> Duration {
        let elapsed = self.started.map_or(Duration::ZERO, |at| at.elapsed());
        (self.offset + elapsed).min(self.length)
    }
}

/// Known source lengths keyed by the URL assigned as `src`
///
/// Clones share one table, so sources added while the element is owned by
/// the runtime still get their real length.
#[derive(Debug, Clone, Default)]
pub struct LengthTable(Arc<Mutex<HashMap<String, Duration>>>);

impl LengthTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Duration>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, src: impl Into<String>, length: Duration) {
        self.table().insert(src.into(), length);
    }

    pub fn get(&self, src: &str) -> Option<Duration> {
        self.table().get(src).copied()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

pub struct SimulatedElement {
    clock: Arc<Mutex<Clock>>,
    sink: MediaSink,
    lengths: LengthTable,
    fallback: Duration,
    volume: f32,
    end_timer: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SimulatedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedElement")
            .field("clock", &*self.clock())
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl SimulatedElement {
    pub fn new(sink: MediaSink) -> Self {
        Self {
            clock: Arc::new(Mutex::new(Clock {
                src: None,
                length: DEFAULT_TRACK_LENGTH,
                paused: true,
                ended: false,
                fresh: false,
                offset: Duration::ZERO,
                started: None,
                generation: 0,
            })),
            sink,
            lengths: LengthTable::new(),
            fallback: DEFAULT_TRACK_LENGTH,
            volume: 1.0,
            end_timer: None,
        }
    }

    #[must_use]
    pub fn with_lengths(mut self, lengths: LengthTable) -> Self {
        self.lengths = lengths;
        self
    }

    /// Length used for sources missing from the length table
    #[must_use]
    pub fn with_fallback(mut self, fallback: Duration) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: impl IntoIterator<Item = MediaEvent>) {
        for event in events {
            if !self.sink.emit(event) {
                trace!("Runtime gone, dropping media event");
                return;
            }
        }
    }

    fn cancel_end(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
        self.clock().generation += 1;
    }

    /// Arrange for `pause` + `ended` once the play head reaches the end
    fn schedule_end(&mut self) {
        self.cancel_end();

        let (remaining, generation) = {
            let clock = self.clock();
            (clock.length.saturating_sub(clock.position()), clock.generation)
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No tokio runtime, source will not end on its own");
            return;
        };

        let clock = Arc::clone(&self.clock);
        let sink = self.sink.for_current_source();
        self.end_timer = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            {
                let mut clock = clock.lock().unwrap_or_else(PoisonError::into_inner);
                if clock.generation != generation {
                    return;
                }
                clock.offset = clock.length;
                clock.started = None;
                clock.paused = true;
                clock.ended = true;
            }
            sink.emit(MediaEvent::Pause);
            sink.emit(MediaEvent::Ended);
        }));
    }
}

impl MediaElement for SimulatedElement {
    fn play(&mut self) {
        let events = {
            let mut clock = self.clock();
            if clock.src.is_none() || !clock.paused {
                return;
            }
            if clock.ended {
                clock.ended = false;
                clock.offset = Duration::ZERO;
            }
            clock.paused = false;
            clock.started = Some(Instant::now());

            let mut events = Vec::with_capacity(2);
            if std::mem::take(&mut clock.fresh) {
                events.push(MediaEvent::CanPlayThrough);
            }
            events.push(MediaEvent::Play);
            events
        };
        self.schedule_end();
        self.emit(events);
    }

    fn pause(&mut self) {
        {
            let mut clock = self.clock();
            if clock.paused {
                return;
            }
            clock.offset = clock.position();
            clock.started = None;
            clock.paused = true;
        }
        self.cancel_end();
        self.emit([MediaEvent::Pause]);
    }

    fn is_paused(&self) -> bool {
        self.clock().paused
    }

    fn is_ended(&self) -> bool {
        self.clock().ended
    }

    fn current_time(&self) -> Duration {
        self.clock().position()
    }

    fn seek(&mut self, position: Duration) {
        let playing = {
            let mut clock = self.clock();
            clock.offset = position.min(clock.length);
            clock.ended = false;
            if clock.started.is_some() {
                clock.started = Some(Instant::now());
            }
            !clock.paused
        };
        if playing {
            self.schedule_end();
        }
    }

    fn src(&self) -> Option<String> {
        self.clock().src.clone()
    }

    fn set_src(&mut self, src: &str) {
        self.cancel_end();
        let length = self.lengths.get(src).unwrap_or(self.fallback);
        let was_playing = {
            let mut clock = self.clock();
            let was_playing = !clock.paused;
            clock.src = Some(src.to_string());
            clock.length = length;
            clock.paused = true;
            clock.ended = false;
            clock.fresh = true;
            clock.offset = Duration::ZERO;
            clock.started = None;
            was_playing
        };
        debug!(src, length_secs = length.as_secs(), "Source assigned");
        if was_playing {
            self.emit([MediaEvent::Pause]);
        }
        self.emit([MediaEvent::LoadStart]);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

impl Drop for SimulatedElement {
    fn drop(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_playback::testing::MockElement;
    use orbit_playback::{
        DataUrlDecoder, PlaybackConfig, PlayerRuntime, RuntimeHandle, StoreAction,
    };

    fn sink() -> (PlayerRuntime, RuntimeHandle, MediaSink) {
        let (runtime, handle) =
            PlayerRuntime::new(PlaybackConfig::default(), DataUrlDecoder, |_| MockElement::new());
        let sink = handle.media_sink();
        (runtime, handle, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn clock_follows_play_and_pause() {
        let (_runtime, _handle, sink) = sink();
        let mut element = SimulatedElement::new(sink);
        element.set_src("https://cdn.example/a.mp3");
        element.play();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(element.current_time(), Duration::from_secs(2));

        element.pause();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(element.current_time(), Duration::from_secs(2));
        assert!(element.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn source_ends_at_known_length() {
        let (_runtime, _handle, sink) = sink();
        let lengths = LengthTable::new();
        lengths.insert("file:///music/short.wav", Duration::from_secs(4));
        let mut element = SimulatedElement::new(sink).with_lengths(lengths);

        element.set_src("file:///music/short.wav");
        element.play();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!element.is_ended());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(element.is_ended());
        assert!(element.is_paused());
        assert_eq!(element.current_time(), Duration::from_secs(4));

        // Playing again starts over
        element.play();
        assert!(!element.is_ended());
        assert_eq!(element.current_time(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn seek_moves_the_end() {
        let (_runtime, _handle, sink) = sink();
        let mut element = SimulatedElement::new(sink).with_fallback(Duration::from_secs(10));
        element.set_src("https://cdn.example/a.mp3");
        element.play();

        tokio::time::sleep(Duration::from_secs(8)).await;
        element.seek(Duration::ZERO);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!element.is_ended());
        assert_eq!(element.current_time(), Duration::from_secs(5));
    }

    #[test]
    fn new_source_resets_the_clock() {
        let (_runtime, _handle, sink) = sink();
        let mut element = SimulatedElement::new(sink);
        assert_eq!(element.src(), None);

        element.set_src("https://cdn.example/a.mp3");
        element.seek(Duration::from_secs(30));
        element.set_src("https://cdn.example/b.mp3");
        assert_eq!(element.current_time(), Duration::ZERO);
        assert_eq!(element.src().as_deref(), Some("https://cdn.example/b.mp3"));
        assert!(element.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_a_playing_source_reports_pause_first() {
        let (runtime, handle, sink) = sink();
        let mut actions = handle.subscribe();
        tokio::spawn(runtime.run());

        let mut element = SimulatedElement::new(sink);
        element.set_src("https://cdn.example/a.mp3");
        element.play();
        element.set_src("https://cdn.example/b.mp3");
        tokio::time::sleep(Duration::from_millis(1)).await;

        let mut seen = Vec::new();
        while let Ok(action) = actions.try_recv() {
            seen.push(action);
        }
        assert_eq!(
            seen,
            vec![
                StoreAction::LoadingStarted,
                StoreAction::LoadingFinished,
                StoreAction::Playing,
                StoreAction::Paused,
                StoreAction::LoadingStarted,
            ]
        );
    }

    #[test]
    fn volume_is_clamped() {
        let (_runtime, _handle, sink) = sink();
        let mut element = SimulatedElement::new(sink);
        element.set_volume(1.4);
        assert_eq!(element.volume(), 1.0);
    }
}
