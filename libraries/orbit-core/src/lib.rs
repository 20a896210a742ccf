//! Orbit Player Core
//!
//! Data model shared by the playback engine, the ingestion pipeline and the
//! applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Identifiers**: `TrackId`, a stable opaque key
//! - **Tracks**: `Track` with tag metadata and exactly one `TrackLocation`
//! - **Catalog**: `Catalog`, the id → track mapping a playlist refers into
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use orbit_core::{Catalog, Track};
//!
//! let track = Track::remote("Rhyme", "Professor Kliq", "Rhyme", "https://cdn.example/rhyme.mp3");
//! let id = track.id.clone();
//!
//! let mut catalog = Catalog::new();
//! assert_eq!(catalog.insert(track), Ok(true));
//!
//! assert!(catalog.contains(&id));
//! assert_eq!(catalog.get(&id).and_then(|t| t.remote_url()), Some("https://cdn.example/rhyme.mp3"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{Catalog, LocalFile, Track, TrackId, TrackLocation};
