//! Playlist with a current-track pointer
//!
//! Keeps the ordered slots and the current index together so every mutation
//! re-establishes `current < len` before returning. Readers never see a
//! dangling index.
//!
//! ```text
//! slots:    [ a1 | b7 | a1 | c3 ]     ids are opaque, duplicates are
//! current:         ^ 1                distinct slots
//! ```

use crate::error::{PlaybackError, Result};
use crate::reorder::reorder;
use orbit_core::TrackId;

/// Ordered track ids plus the "now playing" slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    /// Playback order
    entries: Vec<TrackId>,

    /// `None` iff `entries` is empty
    current: Option<usize>,
}

/// Outcome of removing a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Id that occupied the slot
    pub id: TrackId,

    /// Whether the removed slot was the current one
    pub was_current: bool,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from store state, checking the index invariant
    pub fn from_parts(entries: Vec<TrackId>, current: Option<usize>) -> Result<Self> {
        match (entries.is_empty(), current) {
            (true, None) => {}
            (true, Some(index)) => {
                return Err(PlaybackError::InvalidSnapshot(format!(
                    "current track {index} set on an empty playlist"
                )))
            }
            (false, None) => {
                return Err(PlaybackError::InvalidSnapshot(
                    "non-empty playlist without a current track".to_string(),
                ))
            }
            (false, Some(index)) if index >= entries.len() => {
                return Err(PlaybackError::InvalidSnapshot(format!(
                    "current track {index} outside playlist of length {}",
                    entries.len()
                )))
            }
            (false, Some(_)) => {}
        }
        Ok(Self { entries, current })
    }

    /// Track ids in playback order
    pub fn entries(&self) -> &[TrackId] {
        &self.entries
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if playlist is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current slot
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Id in the current slot
    pub fn current_id(&self) -> Option<&TrackId> {
        self.current.and_then(|index| self.entries.get(index))
    }

    /// Whether any slot still refers to `id`
    pub fn references(&self, id: &TrackId) -> bool {
        self.entries.contains(id)
    }

    /// Append ids at the end
    ///
    /// The first append into an empty playlist points the current index at
    /// slot 0.
    pub fn append(&mut self, ids: impl IntoIterator<Item = TrackId>) -> usize {
        let before = self.entries.len();
        self.entries.extend(ids);
        if self.current.is_none() && !self.entries.is_empty() {
            self.current = Some(0);
        }
        self.entries.len() - before
    }

    /// Point the current index at `index`
    ///
    /// Returns whether the index changed.
    pub fn select(&mut self, index: usize) -> Result<bool> {
        if index >= self.entries.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        let changed = self.current != Some(index);
        self.current = Some(index);
        Ok(changed)
    }

    /// Remove the slot at `index`
    ///
    /// Slots after the current one do not move it. Removing an earlier slot
    /// shifts it back by one. Removing the current slot leaves the index in
    /// place so the following track slides into it, clamped to the new last
    /// slot.
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        if index >= self.entries.len() {
            return None;
        }

        let id = self.entries.remove(index);
        let current = self.current?;
        let was_current = current == index;

        self.current = if self.entries.is_empty() {
            None
        } else if index < current {
            Some(current - 1)
        } else if was_current {
            Some(current.min(self.entries.len() - 1))
        } else {
            Some(current)
        };

        Some(Removal { id, was_current })
    }

    /// Move the slot at `from` to `to`
    ///
    /// Returns `false` for a cancelled gesture (no destination, out of range)
    /// or a move onto the same slot.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        let Some(dest) = to else {
            return false;
        };
        if from == dest || from >= self.entries.len() || dest >= self.entries.len() {
            return false;
        }

        let (entries, current) = reorder(&self.entries, self.current, from, to);
        self.entries = entries;
        self.current = current;
        true
    }

    /// Replace the order wholesale (store `ARRANGE_TRACKS`)
    pub fn arrange(&mut self, entries: Vec<TrackId>, current: Option<usize>) -> Result<()> {
        *self = Self::from_parts(entries, current)?;
        Ok(())
    }
}
