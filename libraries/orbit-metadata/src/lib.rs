//! Orbit Player Metadata
//!
//! Turns audio files picked by the user into [`Track`](orbit_core::Track)
//! records the playback engine can queue.
//!
//! This crate provides:
//! - Tag reading (title, artist, album, duration) via lofty
//! - File and directory discovery with an extension filter
//! - Fallback tags for files that carry none
//!
//! # Example
//!
//! ```rust,no_run
//! use orbit_metadata::TrackScanner;
//! use std::path::PathBuf;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = TrackScanner::new();
//! let report = scanner.scan(&[PathBuf::from("/music")], None).await?;
//!
//! for scanned in &report.tracks {
//!     println!("{} - {}", scanned.track.artist, scanned.track.title);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod reader;
mod scanner;

pub use error::{MetadataError, Result};
pub use reader::{LoftyTagReader, TagReader, TrackTags, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
pub use scanner::{ScanConfig, ScanProgress, ScanReport, ScannedTrack, TrackScanner};
