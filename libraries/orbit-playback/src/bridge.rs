//! Store bridge
//!
//! The controller never touches the application store directly. It emits
//! [`StoreAction`]s, the store reduces them, and the store's state comes back
//! in as a [`StoreSnapshot`].
//!
//! Actions serialise in the store's wire shape:
//!
//! ```json
//! {"type": "SET_CURRENT_TRACK", "data": {"trackIndex": 1}}
//! ```

use crate::error::Result;
use crate::session::Session;
use crate::types::RepeatMode;
use orbit_core::{Catalog, Track, TrackId};
use serde::{Deserialize, Serialize};

/// Action dispatched to the application store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreAction {
    /// The element started loading a source
    #[serde(rename = "LOADING_START")]
    LoadingStarted,

    /// The element can play through
    #[serde(rename = "LOADING_FINISH")]
    LoadingFinished,

    /// Repeat mode changed
    ToggleRepeat { repeat: RepeatMode },

    /// The element reported playback
    Playing,

    /// The element reported a pause
    Paused,

    /// Current index changed
    #[serde(rename_all = "camelCase")]
    SetCurrentTrack { track_index: usize },

    /// Tracks were added to catalog and playlist
    AddTracks { tracks: Vec<Track> },

    /// Playlist order changed; carries the rebased current index
    #[serde(rename_all = "camelCase")]
    ArrangeTracks {
        playlist: Vec<TrackId>,
        current_track: Option<usize>,
    },

    /// A playlist slot was removed
    #[serde(rename_all = "camelCase")]
    RemoveTrack { track_index: usize },

    /// The element reported a fault
    #[serde(rename = "PLAYBACK_ERROR")]
    PlaybackFailed { message: String },

    /// A local file could not be decoded
    #[serde(rename = "LOAD_ERROR", rename_all = "camelCase")]
    LoadFailed { track_id: TrackId, message: String },
}

/// Store state the controller subscribes to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub tracks: Catalog,
    pub playlist: Vec<TrackId>,
    pub current_track: Option<usize>,
    pub repeat: RepeatMode,
}

/// Transport flags the store keeps next to the playlist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub loading: bool,
    pub playing: bool,
    pub error: Option<String>,
}

/// In-process reducer for [`StoreAction`]s
///
/// Stands in for the external store: feeding it every drained action keeps its
/// snapshot equal to the controller's.
#[derive(Debug, Clone, Default)]
pub struct StoreMirror {
    session: Session,
    status: StoreStatus,
}

impl StoreMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing store state
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        Ok(Self {
            session: Session::from_snapshot(snapshot)?,
            status: StoreStatus::default(),
        })
    }

    /// Reduce one action
    pub fn apply(&mut self, action: &StoreAction) -> Result<()> {
        match action {
            StoreAction::LoadingStarted => {
                self.status.loading = true;
                self.status.error = None;
            }
            StoreAction::LoadingFinished => self.status.loading = false,
            StoreAction::Playing => {
                self.status.playing = true;
                self.status.loading = false;
            }
            StoreAction::Paused => self.status.playing = false,
            StoreAction::ToggleRepeat { repeat } => self.session.set_repeat(*repeat),
            StoreAction::SetCurrentTrack { track_index } => {
                self.session.select(*track_index)?;
            }
            StoreAction::AddTracks { tracks } => {
                self.session.add_tracks(tracks)?;
            }
            StoreAction::ArrangeTracks {
                playlist,
                current_track,
            } => self.session.arrange(playlist.clone(), *current_track)?,
            StoreAction::RemoveTrack { track_index } => {
                self.session.remove(*track_index);
            }
            StoreAction::PlaybackFailed { message } | StoreAction::LoadFailed { message, .. } => {
                self.status = StoreStatus {
                    loading: false,
                    playing: false,
                    error: Some(message.clone()),
                };
            }
        }
        Ok(())
    }

    /// Reduce a batch of actions in order
    pub fn apply_all<'a>(
        &mut self,
        actions: impl IntoIterator<Item = &'a StoreAction>,
    ) -> Result<()> {
        actions.into_iter().try_for_each(|action| self.apply(action))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> &StoreStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str) -> Track {
        Track::remote(id, "Artist", "Album", format!("https://cdn.example/{id}.mp3")).with_id(id)
    }

    #[test]
    fn action_wire_shape() {
        let action = StoreAction::SetCurrentTrack { track_index: 1 };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "SET_CURRENT_TRACK", "data": {"trackIndex": 1}})
        );

        let action = StoreAction::ToggleRepeat {
            repeat: RepeatMode::Context,
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "TOGGLE_REPEAT", "data": {"repeat": "context"}})
        );

        assert_eq!(
            serde_json::to_value(StoreAction::LoadingStarted).unwrap(),
            json!({"type": "LOADING_START"})
        );
    }

    #[test]
    fn arrange_tracks_carries_current_track() {
        let action = StoreAction::ArrangeTracks {
            playlist: vec![TrackId::new("b"), TrackId::new("a")],
            current_track: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "ARRANGE_TRACKS", "data": {"playlist": ["b", "a"], "currentTrack": 1}})
        );
    }

    #[test]
    fn load_error_wire_shape() {
        let action = StoreAction::LoadFailed {
            track_id: TrackId::new("a"),
            message: "unreadable".into(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "LOAD_ERROR", "data": {"trackId": "a", "message": "unreadable"}})
        );
    }

    #[test]
    fn actions_deserialize() {
        let action: StoreAction =
            serde_json::from_value(json!({"type": "REMOVE_TRACK", "data": {"trackIndex": 2}}))
                .unwrap();
        assert_eq!(action, StoreAction::RemoveTrack { track_index: 2 });
    }

    #[test]
    fn snapshot_uses_store_field_names() {
        let value = serde_json::to_value(StoreSnapshot::default()).unwrap();
        assert_eq!(
            value,
            json!({"tracks": {}, "playlist": [], "currentTrack": null, "repeat": "off"})
        );
    }

    #[test]
    fn mirror_reduces_playlist_actions() {
        let mut mirror = StoreMirror::new();
        mirror
            .apply_all(&[
                StoreAction::AddTracks {
                    tracks: vec![track("a"), track("b"), track("c")],
                },
                StoreAction::SetCurrentTrack { track_index: 1 },
                StoreAction::RemoveTrack { track_index: 0 },
            ])
            .unwrap();

        let snapshot = mirror.snapshot();
        assert_eq!(snapshot.playlist, vec![TrackId::new("b"), TrackId::new("c")]);
        assert_eq!(snapshot.current_track, Some(0));
        assert_eq!(snapshot.tracks.len(), 2);
    }

    #[test]
    fn mirror_tracks_status_flags() {
        let mut mirror = StoreMirror::new();
        mirror.apply(&StoreAction::LoadingStarted).unwrap();
        assert!(mirror.status().loading);

        mirror.apply(&StoreAction::Playing).unwrap();
        assert!(mirror.status().playing);
        assert!(!mirror.status().loading);

        mirror
            .apply(&StoreAction::PlaybackFailed {
                message: "media stalled".into(),
            })
            .unwrap();
        assert_eq!(mirror.status().error.as_deref(), Some("media stalled"));
        assert!(!mirror.status().playing);
    }

    #[test]
    fn mirror_rejects_out_of_range_selection() {
        let mut mirror = StoreMirror::new();
        assert!(mirror
            .apply(&StoreAction::SetCurrentTrack { track_index: 0 })
            .is_err());
    }
}
