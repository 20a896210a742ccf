//! Track source resolution
//!
//! Decides how a track becomes something the media element can load. Local
//! files go through an asynchronous [`FileDecoder`]; remote URLs are assigned
//! directly unless the element already holds them.
//!
//! Every resolution is stamped with a [`Ticket`]. The controller only honours
//! a completion whose ticket is still the latest one it issued.

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use orbit_core::{LocalFile, Track, TrackLocation};
use std::fmt;

/// Generation token for asynchronous work started by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Token issued after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw generation number
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Playable reference produced by a decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
    /// Value to assign to the element's `src`
    pub url: String,
}

impl PlaybackSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// What has to happen before a track can play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Decode the local file, then assign the result
    Decode(LocalFile),

    /// Assign this URL to the element
    Assign(String),

    /// The element already holds the remote URL; just play
    AlreadyLoaded,
}

/// Decide how `track` reaches the element, given the element's current `src`
///
/// Local files are always decoded: a data reference of an earlier decode is
/// not comparable to the file handle. Remote URLs are compared by substring
/// containment so an element that normalised the URL still counts as loaded.
pub fn resolve_source(track: &Track, element_src: Option<&str>) -> Resolution {
    match &track.location {
        TrackLocation::Local(file) => Resolution::Decode(file.clone()),
        TrackLocation::RemoteUrl(url) => match element_src {
            Some(src) if src.contains(url.as_str()) => Resolution::AlreadyLoaded,
            _ => Resolution::Assign(url.clone()),
        },
    }
}

/// Turns a local file into a playable source
#[async_trait]
pub trait FileDecoder: Send + Sync {
    /// Decode `file` into something the media element can load
    async fn decode(&self, file: &LocalFile) -> Result<PlaybackSource>;
}

/// Reads the whole file and encodes it as a `data:` URL
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlDecoder;

impl DataUrlDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileDecoder for DataUrlDecoder {
    async fn decode(&self, file: &LocalFile) -> Result<PlaybackSource> {
        let bytes = tokio::fs::read(file.path()).await?;
        if bytes.is_empty() {
            return Err(PlaybackError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{} is empty", file.name()),
            )));
        }

        let mime = mime_for(file);
        Ok(PlaybackSource::new(format!(
            "data:{mime};base64,{}",
            STANDARD.encode(bytes)
        )))
    }
}

/// MIME type by file extension
pub fn mime_for(file: &LocalFile) -> &'static str {
    match file.extension().as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        Some("aac") => "audio/aac",
        Some("ogg") => "audio/ogg",
        Some("opus") => "audio/opus",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str) -> Track {
        Track::remote("Song", "Artist", "Album", url)
    }

    #[test]
    fn local_tracks_always_decode() {
        let track = Track::local("Song", "Artist", "Album", "/music/song.mp3");
        let resolution = resolve_source(&track, Some("data:audio/mpeg;base64,AAAA"));
        assert_eq!(
            resolution,
            Resolution::Decode(LocalFile::new("/music/song.mp3"))
        );
    }

    #[test]
    fn remote_track_assigned_when_element_empty() {
        let track = remote("https://cdn.example/a.mp3");
        assert_eq!(
            resolve_source(&track, None),
            Resolution::Assign("https://cdn.example/a.mp3".into())
        );
    }

    #[test]
    fn remote_track_already_loaded_by_containment() {
        let track = remote("cdn.example/a.mp3");
        assert_eq!(
            resolve_source(&track, Some("https://cdn.example/a.mp3")),
            Resolution::AlreadyLoaded
        );
    }

    #[test]
    fn remote_track_with_other_src_is_assigned() {
        let track = remote("https://cdn.example/b.mp3");
        assert_eq!(
            resolve_source(&track, Some("https://cdn.example/a.mp3")),
            Resolution::Assign("https://cdn.example/b.mp3".into())
        );
    }

    #[test]
    fn tickets_increase() {
        let first = Ticket::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(&LocalFile::new("a.MP3")), "audio/mpeg");
        assert_eq!(mime_for(&LocalFile::new("a.m4a")), "audio/mp4");
        assert_eq!(mime_for(&LocalFile::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn data_url_decoder_encodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let source = DataUrlDecoder::new()
            .decode(&LocalFile::new(&path))
            .await
            .unwrap();
        assert_eq!(source.url, "data:audio/wav;base64,UklGRg==");
    }

    #[tokio::test]
    async fn data_url_decoder_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DataUrlDecoder::new()
            .decode(&LocalFile::new(dir.path().join("missing.mp3")))
            .await;
        assert!(matches!(result, Err(PlaybackError::Io(_))));
    }
}
