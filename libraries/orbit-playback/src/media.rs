//! Media element contract
//!
//! The controller drives playback through this trait and learns about the
//! element's lifecycle only from [`MediaEvent`]s fed back to it. A browser
//! audio element, a native player or a test double can sit behind it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback element commanded by the controller
///
/// Commands are fire-and-forget. The element reports what actually happened
/// through [`MediaEvent`]s.
pub trait MediaElement: Send {
    /// Start or resume playback of the current source
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Whether the element is paused (true before the first play)
    fn is_paused(&self) -> bool;

    /// Whether the current source played to its end
    fn is_ended(&self) -> bool;

    /// Elapsed position in the current source
    fn current_time(&self) -> Duration;

    /// Move the play head
    fn seek(&mut self, position: Duration);

    /// Currently assigned source, if any
    fn src(&self) -> Option<String>;

    /// Assign a new source; playback of the old one stops
    fn set_src(&mut self, src: &str);

    /// Output volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);
}

/// Lifecycle events reported by a [`MediaElement`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum MediaEvent {
    /// Element began fetching a source
    LoadStart,

    /// Enough data buffered to play through
    CanPlayThrough,

    /// Playback started or resumed
    Play,

    /// Playback paused
    Pause,

    /// Source played to its end
    Ended,

    /// Fetching stalled
    Stalled,

    /// Loading aborted
    Abort,

    /// Media error
    Error {
        /// Element-provided description
        message: String,
    },
}

impl MediaEvent {
    /// Human-readable fault description
    pub fn describe(&self) -> String {
        match self {
            Self::Stalled => "media stalled".to_string(),
            Self::Abort => "media load aborted".to_string(),
            Self::Error { message } => format!("media error: {message}"),
            other => format!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_deserialize_from_dom_names() {
        let event: MediaEvent = serde_json::from_str(r#"{"type":"canplaythrough"}"#).unwrap();
        assert_eq!(event, MediaEvent::CanPlayThrough);

        let event: MediaEvent =
            serde_json::from_str(r#"{"type":"error","message":"network"}"#).unwrap();
        assert_eq!(event.describe(), "media error: network");
    }
}
