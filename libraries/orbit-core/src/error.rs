/// Core error types for Orbit Player
use crate::types::TrackId;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Orbit Player
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A playlist refers to a track the catalog does not hold
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// A track with the same id but different contents was added
    #[error("Track already exists with different contents: {0}")]
    ConflictingTrack(TrackId),
}
