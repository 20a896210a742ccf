//! Authoritative playlist state
//!
//! Catalog, playlist, current index and repeat mode travel together. The
//! controller owns one `Session`; [`StoreMirror`](crate::StoreMirror) rebuilds
//! another one from emitted actions, so both sides run the same bookkeeping.

use crate::bridge::StoreSnapshot;
use crate::error::{PlaybackError, Result};
use crate::playlist::{Playlist, Removal};
use crate::types::RepeatMode;
use orbit_core::{Catalog, CoreError, Track, TrackId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    catalog: Catalog,
    playlist: Playlist,
    repeat: RepeatMode,
}

impl Session {
    pub fn new(repeat: RepeatMode) -> Self {
        Self {
            repeat,
            ..Self::default()
        }
    }

    /// Rebuild a session from store state
    ///
    /// Every playlist id must resolve in the catalog and the current index
    /// must satisfy the playlist invariant.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let StoreSnapshot {
            tracks,
            playlist,
            current_track,
            repeat,
        } = snapshot;

        if let Some(missing) = playlist.iter().find(|id| !tracks.contains(id)) {
            return Err(PlaybackError::InvalidSnapshot(format!(
                "playlist refers to unknown track {missing}"
            )));
        }

        Ok(Self {
            catalog: tracks,
            playlist: Playlist::from_parts(playlist, current_track)?,
            repeat,
        })
    }

    /// Snapshot in store shape
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tracks: self.catalog.clone(),
            playlist: self.playlist.entries().to_vec(),
            current_track: self.playlist.current(),
            repeat: self.repeat,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    /// Advance the repeat mode one step and return the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        self.repeat
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.current()
    }

    /// Track in the current slot
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist
            .current_id()
            .and_then(|id| self.catalog.get(id))
    }

    /// Add tracks to the catalog and append them to the playlist
    ///
    /// The batch is all-or-nothing: a track whose id is already known with
    /// different contents rejects the whole batch.
    pub fn add_tracks(&mut self, tracks: &[Track]) -> Result<usize> {
        let mut staged = self.catalog.clone();
        for track in tracks {
            staged.insert(track.clone())?;
        }
        self.catalog = staged;
        Ok(self.playlist.append(tracks.iter().map(|t| t.id.clone())))
    }

    pub fn select(&mut self, index: usize) -> Result<bool> {
        self.playlist.select(index)
    }

    /// Remove a playlist slot, dropping its catalog entry once unreferenced
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        let removal = self.playlist.remove(index)?;
        if !self.playlist.references(&removal.id) {
            self.catalog.remove(&removal.id);
        }
        Some(removal)
    }

    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        self.playlist.reorder(from, to)
    }

    /// Replace order and current index with values arranged elsewhere
    pub fn arrange(&mut self, entries: Vec<TrackId>, current: Option<usize>) -> Result<()> {
        if let Some(missing) = entries.iter().find(|id| !self.catalog.contains(id)) {
            return Err(CoreError::TrackNotFound(missing.clone()).into());
        }
        self.playlist.arrange(entries, current)
    }
}
