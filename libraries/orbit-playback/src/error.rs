//! Error types for playback management

use orbit_core::{CoreError, TrackId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Index out of bounds
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A local file could not be turned into a playable source
    #[error("Failed to decode track {track}: {message}")]
    Decode { track: TrackId, message: String },

    /// An inbound store snapshot broke the playlist invariants
    #[error("Invalid store snapshot: {0}")]
    InvalidSnapshot(String),

    /// The runtime loop has stopped
    #[error("Playback runtime is no longer running")]
    RuntimeClosed,

    /// Catalog errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
