/// Shell error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    Parse(#[from] crate::commands::ParseError),

    #[error("Playback error: {0}")]
    Playback(#[from] orbit_playback::PlaybackError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] orbit_metadata::MetadataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ShellError {
    fn from(err: config::ConfigError) -> Self {
        ShellError::Config(err.to_string())
    }
}
