//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Repeat mode
///
/// Only consulted when a track ends on its own; user skips ignore it except
/// for deciding whether to play after wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    Off,

    /// Loop current track only
    Track,

    /// Loop the whole playlist
    Context,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: off → track → context → off
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Track,
            Self::Track => Self::Context,
            Self::Context => Self::Off,
        }
    }

    /// Lowercase name as used by the store
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Context => "context",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "track" | "one" => Ok(Self::Track),
            "context" | "all" => Ok(Self::Context),
            other => Err(format!("unknown repeat mode '{other}'")),
        }
    }
}

/// Playback phase
///
/// Driven by media element events. A play request only moves to `Loading`;
/// `Playing` requires the element's `play` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Nothing started yet, or the last attempt failed
    #[default]
    Idle,

    /// Waiting for a source or for the element to start
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

impl PlaybackPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the controller is advancing to the next track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    /// The user pressed "next"
    User,

    /// The previous track ended on its own
    Auto,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay before a toggled play starts, so it does not overlap the UI
    /// button sound (default: 500)
    pub start_delay_ms: u64,

    /// Elapsed time after which "previous" restarts the track instead of
    /// changing it (default: 3.0)
    pub scrub_threshold_secs: f64,

    /// Element volume, 0.0 - 1.0 (default: 0.75)
    pub volume: f32,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 500,
            scrub_threshold_secs: 3.0,
            volume: 0.75,
            repeat: RepeatMode::Off,
        }
    }
}

impl PlaybackConfig {
    /// Start delay as a `Duration`
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Scrub threshold as a `Duration` (negative or NaN values count as zero)
    pub fn scrub_threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.scrub_threshold_secs).unwrap_or(Duration::ZERO)
    }
}
