//! Scenario tests for the playback controller
//!
//! Each scenario drives the controller with a recording element and checks
//! both the element commands and what a store fed the emitted actions sees.

use orbit_core::{Track, TrackId};
use orbit_playback::testing::{ElementCall, MockElement};
use orbit_playback::{
    AdvanceCause, MediaElement, MediaEvent, PlaybackConfig, PlaybackController, PlaybackPhase,
    RepeatMode, StoreAction, StoreMirror, Task,
};
use std::time::Duration;

struct Harness {
    controller: PlaybackController,
    element: MockElement,
    store: StoreMirror,
}

impl Harness {
    fn new(ids: &[&str]) -> Self {
        let element = MockElement::new();
        let mut harness = Self {
            controller: PlaybackController::new(PlaybackConfig::default(), element.clone()),
            element,
            store: StoreMirror::new(),
        };
        let tracks = ids
            .iter()
            .map(|id| {
                Track::remote(*id, "Artist", "Album", format!("https://cdn.example/{id}.mp3"))
                    .with_id(*id)
            })
            .collect();
        harness.controller.add_tracks(tracks).unwrap();
        harness.sync();
        harness
    }

    /// Push emitted actions into the store, returning them
    fn sync(&mut self) -> Vec<StoreAction> {
        let actions = self.controller.drain_actions();
        self.store.apply_all(&actions).unwrap();
        actions
    }

    /// Toggle and let the start delay run out; the element confirms playback
    fn play(&mut self) {
        self.controller.toggle_play();
        for task in self.controller.drain_tasks() {
            if let Task::StartAfter { ticket, .. } = task {
                self.controller.start_delay_elapsed(ticket);
            }
        }
        self.controller.handle_media_event(MediaEvent::LoadStart);
        self.controller.handle_media_event(MediaEvent::CanPlayThrough);
        self.controller.handle_media_event(MediaEvent::Play);
        self.sync();
    }

    fn current_id(&self) -> Option<&str> {
        self.controller.current_track().map(|t| t.id.as_str())
    }
}

#[test]
fn move_before_current_rebases_index() {
    let mut h = Harness::new(&["A", "B", "C"]);
    h.controller.set_current_track(1).unwrap();
    h.sync();

    h.controller.reorder(0, Some(2));
    h.sync();

    let snapshot = h.store.snapshot();
    assert_eq!(
        snapshot.playlist,
        vec![TrackId::new("B"), TrackId::new("C"), TrackId::new("A")]
    );
    assert_eq!(snapshot.current_track, Some(0));
    assert_eq!(h.current_id(), Some("B"));
}

#[test]
fn moving_current_track_follows_it() {
    let mut h = Harness::new(&["A", "B", "C", "D"]);
    h.controller.set_current_track(1).unwrap();

    h.controller.reorder(1, Some(3));
    assert_eq!(h.controller.current_index(), Some(3));
    assert_eq!(h.current_id(), Some("B"));
}

#[test]
fn dropping_onto_top_shifts_current_down() {
    let mut h = Harness::new(&["A", "B", "C"]);
    h.controller.reorder(2, Some(0));
    assert_eq!(h.controller.current_index(), Some(1));
    assert_eq!(h.current_id(), Some("A"));
}

#[test]
fn playlist_plays_through_then_waits() {
    let mut h = Harness::new(&["A", "B", "C"]);
    h.play();

    for expected in ["B", "C"] {
        h.controller.handle_media_event(MediaEvent::Ended);
        h.controller.handle_media_event(MediaEvent::Play);
        h.sync();
        assert_eq!(h.current_id(), Some(expected));
    }

    h.element.clear_calls();
    h.controller.handle_media_event(MediaEvent::Ended);
    h.sync();

    assert_eq!(h.controller.current_index(), Some(0));
    assert_eq!(h.element.play_count(), 0);
    assert_eq!(h.store.snapshot().current_track, Some(0));
}

#[test]
fn context_repeat_loops_playlist() {
    let mut h = Harness::new(&["A", "B"]);
    h.controller.toggle_repeat();
    h.controller.toggle_repeat();
    h.play();

    h.controller.load_next(AdvanceCause::Auto);
    h.controller.load_next(AdvanceCause::Auto);
    h.sync();

    assert_eq!(h.current_id(), Some("A"));
    assert_eq!(h.store.snapshot().repeat, RepeatMode::Context);
    assert_eq!(
        h.element.assigned_sources().last().map(String::as_str),
        Some("https://cdn.example/A.mp3")
    );
}

#[test]
fn track_repeat_never_changes_index() {
    let mut h = Harness::new(&["A", "B"]);
    h.controller.toggle_repeat();
    h.play();

    for _ in 0..3 {
        h.controller.handle_media_event(MediaEvent::Ended);
        h.controller.handle_media_event(MediaEvent::Play);
    }
    let actions = h.sync();

    assert_eq!(h.controller.current_index(), Some(0));
    assert!(actions
        .iter()
        .all(|a| !matches!(a, StoreAction::SetCurrentTrack { .. })));
}

#[test]
fn skip_back_scrubs_after_three_seconds() {
    let mut h = Harness::new(&["A", "B"]);
    h.controller.set_current_track(1).unwrap();
    h.element.set_current_time(Duration::from_secs_f64(42.5));
    h.element.clear_calls();

    h.controller.previous_track();
    assert_eq!(h.controller.current_index(), Some(1));
    assert_eq!(h.element.calls(), vec![ElementCall::Seek(Duration::ZERO)]);

    h.controller.previous_track();
    assert_eq!(h.controller.current_index(), Some(0));
}

#[test]
fn removing_current_while_paused_only_selects() {
    let mut h = Harness::new(&["A", "B", "C"]);
    h.play();
    h.controller.toggle_play();
    h.controller.handle_media_event(MediaEvent::Pause);
    h.element.clear_calls();

    h.controller.remove_track(0).unwrap();
    h.sync();

    assert_eq!(h.current_id(), Some("B"));
    assert_eq!(h.controller.phase(), PlaybackPhase::Paused);
    assert!(h.element.assigned_sources().is_empty());
    assert_eq!(h.store.snapshot(), h.controller.snapshot());
}

#[test]
fn removing_earlier_slot_keeps_current_track() {
    let mut h = Harness::new(&["A", "B", "C"]);
    h.controller.set_current_track(2).unwrap();

    h.controller.remove_track(0).unwrap();
    h.sync();

    assert_eq!(h.controller.current_index(), Some(1));
    assert_eq!(h.current_id(), Some("C"));
    assert_eq!(h.store.snapshot(), h.controller.snapshot());
}

#[test]
fn fault_then_toggle_restarts_playback() {
    let mut h = Harness::new(&["A"]);
    h.play();
    MediaElement::pause(&mut h.element);
    h.controller.handle_media_event(MediaEvent::Error {
        message: "network".into(),
    });
    h.sync();
    assert_eq!(h.controller.phase(), PlaybackPhase::Idle);
    assert_eq!(
        h.store.status().error.as_deref(),
        Some("media error: network")
    );

    h.element.clear_calls();
    h.play();
    assert_eq!(h.element.play_count(), 1);
    assert_eq!(h.controller.phase(), PlaybackPhase::Playing);
    assert!(h.store.status().playing);
    assert!(h.store.status().error.is_none());
}

#[test]
fn store_snapshot_drives_controller() {
    let mut h = Harness::new(&["A", "B"]);
    let mut snapshot = h.controller.snapshot();
    snapshot.playlist.reverse();
    snapshot.repeat = RepeatMode::Track;

    h.controller.apply_snapshot(snapshot.clone()).unwrap();
    assert_eq!(h.controller.snapshot(), snapshot);
    assert_eq!(h.current_id(), Some("B"));
    assert_eq!(h.controller.repeat(), RepeatMode::Track);
}
