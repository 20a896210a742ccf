//! End-to-end tests for the tokio runtime
//!
//! Time is paused, so start delays and slow decodes run instantly but in the
//! right order.

use async_trait::async_trait;
use orbit_core::{LocalFile, Track};
use orbit_playback::testing::{ElementCall, MockElement};
use orbit_playback::{
    Command, FileDecoder, MediaElement, MediaEvent, PlaybackConfig, PlaybackError, PlaybackPhase,
    PlaybackSource, PlayerRuntime, Result, RuntimeHandle, StoreAction,
};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Decoder that takes 1s for files named `slow*` and fails on `broken*`
struct StubDecoder;

#[async_trait]
impl FileDecoder for StubDecoder {
    async fn decode(&self, file: &LocalFile) -> Result<PlaybackSource> {
        let name = file.name();
        if name.starts_with("slow") {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        if name.starts_with("broken") {
            return Err(PlaybackError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not audio",
            )));
        }
        Ok(PlaybackSource::new(format!("data:{name}")))
    }
}

fn remote(id: &str) -> Track {
    Track::remote(id, "Artist", "Album", format!("https://cdn.example/{id}.mp3")).with_id(id)
}

fn local(id: &str, file: &str) -> Track {
    Track::local(id, "Artist", "Album", format!("/music/{file}")).with_id(id)
}

fn spawn_runtime() -> (
    RuntimeHandle,
    MockElement,
    JoinHandle<orbit_playback::PlaybackController>,
) {
    let element = MockElement::new();
    let recorder = element.clone();
    let (runtime, handle) =
        PlayerRuntime::new(PlaybackConfig::default(), StubDecoder, |sink| {
            element.with_sink(sink)
        });
    let task = tokio::spawn(runtime.run());
    (handle, recorder, task)
}

fn drain(actions: &mut broadcast::Receiver<StoreAction>) -> Vec<StoreAction> {
    let mut out = Vec::new();
    while let Ok(action) = actions.try_recv() {
        out.push(action);
    }
    out
}

/// Let the runtime process everything queued so far
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn toggle_starts_after_delay() {
    let (handle, element, _task) = spawn_runtime();
    let mut actions = handle.subscribe();

    handle
        .send(Command::AddTracks(vec![remote("a"), remote("b")]))
        .unwrap();
    handle.send(Command::TogglePlay).unwrap();

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(element.play_count(), 0);
    assert_eq!(
        handle.status().await.unwrap().phase,
        PlaybackPhase::Loading
    );

    tokio::time::sleep(Duration::from_millis(2)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.phase, PlaybackPhase::Playing);
    assert_eq!(status.current_index, Some(0));

    let actions = drain(&mut actions);
    assert!(matches!(actions[0], StoreAction::AddTracks { .. }));
    assert_eq!(
        actions[1..],
        [
            StoreAction::LoadingStarted,
            StoreAction::LoadingFinished,
            StoreAction::Playing
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn ended_advances_and_stops_at_wrap() {
    let (handle, element, _task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![remote("a"), remote("b")]))
        .unwrap();
    handle.send(Command::TogglePlay).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    element.finish();
    settle().await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.current_index, Some(1));
    assert_eq!(status.phase, PlaybackPhase::Playing);

    element.finish();
    settle().await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.current_index, Some(0));
    assert_eq!(status.phase, PlaybackPhase::Paused);
    assert_eq!(
        element.assigned_sources(),
        vec![
            "https://cdn.example/a.mp3".to_string(),
            "https://cdn.example/b.mp3".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn ended_queued_behind_skip_is_dropped() {
    let (handle, element, _task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![remote("a"), remote("b"), remote("c")]))
        .unwrap();
    handle.send(Command::TogglePlay).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    // The end of "a" is reported before the skip is processed
    handle.send(Command::Next).unwrap();
    handle.media_event(MediaEvent::Ended).unwrap();
    settle().await;

    let status = handle.status().await.unwrap();
    assert_eq!(status.current_index, Some(1));
    assert_eq!(status.phase, PlaybackPhase::Playing);
    assert_eq!(
        element.assigned_sources(),
        vec![
            "https://cdn.example/a.mp3".to_string(),
            "https://cdn.example/b.mp3".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn skipping_a_playing_track_reports_pause_before_load() {
    let (handle, _element, _task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![remote("a"), remote("b")]))
        .unwrap();
    handle.send(Command::TogglePlay).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let mut actions = handle.subscribe();
    handle.send(Command::Next).unwrap();
    settle().await;

    assert_eq!(
        drain(&mut actions),
        vec![
            StoreAction::SetCurrentTrack { track_index: 1 },
            StoreAction::Paused,
            StoreAction::LoadingStarted,
            StoreAction::LoadingFinished,
            StoreAction::Playing,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn removing_last_playing_track_stays_idle() {
    let (handle, element, _task) = spawn_runtime();

    handle.send(Command::AddTracks(vec![remote("a")])).unwrap();
    handle.send(Command::Select(0)).unwrap();
    settle().await;
    assert_eq!(
        handle.status().await.unwrap().phase,
        PlaybackPhase::Playing
    );

    handle.send(Command::Remove(0)).unwrap();
    settle().await;

    let status = handle.status().await.unwrap();
    assert_eq!(status.phase, PlaybackPhase::Idle);
    assert_eq!(status.current_index, None);
    assert!(element.calls().contains(&ElementCall::Pause));
}

#[tokio::test(start_paused = true)]
async fn single_toggle_recovers_from_stall() {
    let (handle, element, _task) = spawn_runtime();

    handle.send(Command::AddTracks(vec![remote("a")])).unwrap();
    handle.send(Command::TogglePlay).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    handle.media_event(MediaEvent::Stalled).unwrap();
    settle().await;
    assert_eq!(handle.status().await.unwrap().phase, PlaybackPhase::Idle);
    assert!(element.is_paused());

    handle.send(Command::TogglePlay).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(
        handle.status().await.unwrap().phase,
        PlaybackPhase::Playing
    );
    assert_eq!(element.play_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn local_track_is_decoded_then_played() {
    let (handle, element, _task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![local("one", "one.mp3")]))
        .unwrap();
    handle.send(Command::Select(0)).unwrap();
    settle().await;

    assert_eq!(element.assigned_sources(), vec!["data:one.mp3".to_string()]);
    assert_eq!(
        handle.status().await.unwrap().phase,
        PlaybackPhase::Playing
    );
}

#[tokio::test(start_paused = true)]
async fn slow_decode_is_superseded() {
    let (handle, element, _task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![
            local("slow", "slow.mp3"),
            local("fast", "fast.mp3"),
        ]))
        .unwrap();
    handle.send(Command::Select(0)).unwrap();
    handle.send(Command::Next).unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(element.assigned_sources(), vec!["data:fast.mp3".to_string()]);
    assert_eq!(handle.status().await.unwrap().current_index, Some(1));
}

#[tokio::test(start_paused = true)]
async fn decode_failure_reports_load_error() {
    let (handle, element, _task) = spawn_runtime();
    let mut actions = handle.subscribe();

    handle
        .send(Command::AddTracks(vec![local("bad", "broken.mp3")]))
        .unwrap();
    handle.send(Command::Select(0)).unwrap();
    settle().await;

    assert_eq!(handle.status().await.unwrap().phase, PlaybackPhase::Idle);
    assert_eq!(element.play_count(), 0);
    assert!(drain(&mut actions)
        .iter()
        .any(|a| matches!(a, StoreAction::LoadFailed { track_id, .. } if track_id.as_str() == "bad")));
}

#[tokio::test(start_paused = true)]
async fn toggle_twice_quickly_cancels_start() {
    let (handle, element, _task) = spawn_runtime();

    handle.send(Command::AddTracks(vec![remote("a")])).unwrap();
    handle.send(Command::TogglePlay).unwrap();
    handle.send(Command::Pause).unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(element.play_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_returns_controller() {
    let (handle, _element, task) = spawn_runtime();

    handle
        .send(Command::AddTracks(vec![remote("a"), remote("b"), remote("c")]))
        .unwrap();
    handle
        .send(Command::Reorder {
            from: 0,
            to: Some(2),
        })
        .unwrap();
    handle.send(Command::Shutdown).unwrap();

    let controller = task.await.unwrap();
    let order: Vec<&str> = controller.playlist().iter().map(|id| id.as_str()).collect();
    assert_eq!(order, ["b", "c", "a"]);
    assert_eq!(controller.current_index(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn runtime_stops_when_handles_dropped() {
    let (handle, _element, task) = spawn_runtime();
    handle.send(Command::AddTracks(vec![remote("a")])).unwrap();
    drop(handle);

    let controller = task.await.unwrap();
    assert_eq!(controller.playlist().len(), 1);
}
