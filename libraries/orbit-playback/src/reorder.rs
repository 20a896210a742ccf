//! Playlist reorder algorithm
//!
//! A reorder is a single-element move: the entry at `from` is removed and
//! reinserted at `to`, and everything in between shifts by one slot. The
//! interesting part is rebasing the current index so it keeps pointing at the
//! same track.
//!
//! ```text
//!  from < current < to           current < from, to <= current
//!  [A B C D]  move 0 -> 3        [A B C D]  move 3 -> 0
//!     ^ current = 1                 ^ current = 1
//!  [B C D A]                     [D A B C]
//!   ^ current = 0                     ^ current = 2
//! ```

/// How a move relates to the current slot
///
/// Each variant is one rebasing rule. Classification happens once and the
/// rebased index follows from an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Displacement {
    /// The moved entry is the current one; the current index follows it
    MovedCurrent,

    /// Dropped onto the current slot coming from an earlier slot
    LandedFromBelow,

    /// Dropped onto the current slot coming from a later slot
    LandedFromAbove,

    /// A later entry moved in front of the current one
    CrossedForward,

    /// An earlier entry moved behind the current one
    CrossedBackward,

    /// The move does not cross the current slot
    Unaffected,
}

impl Displacement {
    /// Classify a move of `from` to `to` relative to `current`
    pub fn classify(current: usize, from: usize, to: usize) -> Self {
        if from == current {
            Self::MovedCurrent
        } else if to == current {
            if from < current {
                Self::LandedFromBelow
            } else {
                Self::LandedFromAbove
            }
        } else if from > current && current > to {
            Self::CrossedForward
        } else if from < current && current < to {
            Self::CrossedBackward
        } else {
            Self::Unaffected
        }
    }

    /// Current index after the move
    pub fn rebase(self, current: usize, to: usize) -> usize {
        match self {
            Self::MovedCurrent => to,
            Self::LandedFromBelow | Self::CrossedBackward => current - 1,
            // The current entry sits at `to` here, so `current + 1` is also
            // correct when dropping at the very top (`to == 0` gives 1)
            Self::LandedFromAbove | Self::CrossedForward => current + 1,
            Self::Unaffected => current,
        }
    }
}

/// Rebase `current` for a move of `from` to `to`
///
/// `None` stays `None` (empty playlist).
pub fn rebase_current(current: Option<usize>, from: usize, to: usize) -> Option<usize> {
    current.map(|current| Displacement::classify(current, from, to).rebase(current, to))
}

/// Move one entry and rebase the current index
///
/// A missing destination (dropped outside the list) or an out-of-range index
/// is a cancelled gesture: the inputs come back unchanged.
pub fn reorder<T: Clone>(
    playlist: &[T],
    current: Option<usize>,
    from: usize,
    to: Option<usize>,
) -> (Vec<T>, Option<usize>) {
    let Some(to) = to else {
        return (playlist.to_vec(), current);
    };
    if from >= playlist.len() || to >= playlist.len() {
        return (playlist.to_vec(), current);
    }

    let mut items = playlist.to_vec();
    let moved = items.remove(from);
    items.insert(to, moved);

    (items, rebase_current(current, from, to))
}
