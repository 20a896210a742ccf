/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Audio track as known to the catalog
///
/// Immutable once added. The location is an enum so a track always has
/// exactly one of a local file handle or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Where the audio lives
    #[serde(flatten)]
    pub location: TrackLocation,
}

/// Where a track's audio can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackLocation {
    /// A file picked from the local machine; must be decoded before playback
    #[serde(rename = "file")]
    Local(LocalFile),

    /// A URL the media element can load directly
    RemoteUrl(String),
}

/// Handle to a user-supplied local file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Wrap a path on disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directories, lossily converted
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

impl Track {
    /// Create a track backed by a local file, with a fresh id
    pub fn local(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            location: TrackLocation::Local(LocalFile::new(path)),
        }
    }

    /// Create a track backed by a remote URL, with a fresh id
    pub fn remote(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            location: TrackLocation::RemoteUrl(url.into()),
        }
    }

    /// Replace the generated id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<TrackId>) -> Self {
        self.id = id.into();
        self
    }

    /// Local file handle, if the track is local
    pub fn local_file(&self) -> Option<&LocalFile> {
        match &self.location {
            TrackLocation::Local(file) => Some(file),
            TrackLocation::RemoteUrl(_) => None,
        }
    }

    /// Remote URL, if the track is remote
    pub fn remote_url(&self) -> Option<&str> {
        match &self.location {
            TrackLocation::Local(_) => None,
            TrackLocation::RemoteUrl(url) => Some(url),
        }
    }
}
