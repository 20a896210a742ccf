//! Orbit Shell
//!
//! Headless driver for the playback engine: scans files, runs the player
//! against a clock-driven media element and takes commands line by line.
//!
//! This library exposes the pieces for testing purposes.

pub mod app;
pub mod commands;
pub mod config;
pub mod decoder;
pub mod element;
pub mod error;
pub mod format;
pub mod library;

pub use app::{Outcome, Shell};
pub use commands::{ParseError, ShellCommand};
pub use config::{LibrarySettings, ShellConfig};
pub use decoder::FileUrlDecoder;
pub use element::{LengthTable, SimulatedElement};
pub use error::{Result, ShellError};
