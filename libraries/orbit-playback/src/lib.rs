//! Orbit Player - Playback Engine
//!
//! Keeps an ordered, reorderable playlist and its "now playing" pointer in
//! step with an asynchronous media element.
//!
//! This crate provides:
//! - Playlist reordering with current-index rebasing
//! - Playlist removal and selection that never leave a dangling index
//! - Playback state machine (idle, loading, playing, paused)
//! - Repeat modes (off, track, context)
//! - Track source resolution (local file decode vs remote URL)
//! - Store bridge: typed actions out, snapshots in
//! - A tokio runtime that drives it all
//!
//! # Architecture
//!
//! `orbit-playback` is sans-IO at its core:
//! - [`PlaybackController`] is synchronous and never awaits
//! - Asynchronous work is handed out as [`Task`]s stamped with a [`Ticket`]
//! - The media element is reached only through the [`MediaElement`] trait
//! - [`PlayerRuntime`] supplies the event loop, timers and decoding
//!
//! # Example: Reordering
//!
//! ```rust
//! use orbit_playback::reorder;
//!
//! let playlist = ["a", "b", "c"];
//! let (reordered, current) = reorder(&playlist, Some(1), 0, Some(2));
//!
//! assert_eq!(reordered, ["b", "c", "a"]);
//! assert_eq!(current, Some(0)); // still "b"
//! ```
//!
//! # Example: Driving the controller
//!
//! ```rust
//! use orbit_core::Track;
//! use orbit_playback::testing::MockElement;
//! use orbit_playback::{PlaybackConfig, PlaybackController, StoreAction, Task};
//!
//! let element = MockElement::new();
//! let mut controller = PlaybackController::new(PlaybackConfig::default(), element.clone());
//!
//! controller
//!     .add_tracks(vec![Track::remote("Rhyme", "Kliq", "Rhyme", "https://cdn.example/rhyme.mp3")])
//!     .unwrap();
//! assert!(matches!(controller.drain_actions()[..], [StoreAction::AddTracks { .. }]));
//!
//! // Play is deferred by the start delay
//! controller.toggle_play();
//! let ticket = controller.drain_tasks()[0].ticket();
//! controller.start_delay_elapsed(ticket);
//! assert_eq!(element.play_count(), 1);
//! ```

mod bridge;
mod controller;
mod error;
mod media;
mod playlist;
mod reorder;
mod resolver;
mod runtime;
mod session;
pub mod testing;
pub mod types;

// Public exports
pub use bridge::{StoreAction, StoreMirror, StoreSnapshot, StoreStatus};
pub use controller::{PlaybackController, Task};
pub use error::{PlaybackError, Result};
pub use media::{MediaElement, MediaEvent};
pub use playlist::{Playlist, Removal};
pub use reorder::{rebase_current, reorder, Displacement};
pub use resolver::{
    mime_for, resolve_source, DataUrlDecoder, FileDecoder, PlaybackSource, Resolution, Ticket,
};
pub use runtime::{Command, MediaSink, PlayerRuntime, PlayerStatus, RuntimeHandle};
pub use session::Session;
pub use types::{AdvanceCause, PlaybackConfig, PlaybackPhase, RepeatMode};
