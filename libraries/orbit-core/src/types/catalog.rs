/// Track catalog
use crate::error::{CoreError, Result};
use crate::types::{Track, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from track id to track
///
/// Keys are unique and insertion order is irrelevant. A playlist is a
/// sequence of ids that must all resolve here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tracks: HashMap<TrackId, Track>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track
    ///
    /// Returns `false` when the exact same track is already present. Tracks are
    /// immutable, so re-adding an id with different contents is an error.
    pub fn insert(&mut self, track: Track) -> Result<bool> {
        match self.tracks.get(&track.id) {
            Some(existing) if *existing == track => Ok(false),
            Some(_) => Err(CoreError::ConflictingTrack(track.id)),
            None => {
                self.tracks.insert(track.id.clone(), track);
                Ok(true)
            }
        }
    }

    /// Look up a track
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Remove a track
    pub fn remove(&mut self, id: &TrackId) -> Option<Track> {
        self.tracks.remove(id)
    }

    /// Check whether an id is known
    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.contains_key(id)
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate over all tracks (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }
}
