/// Tag reading using lofty
use crate::error::{MetadataError, Result};
use lofty::{AudioFile, ItemKey, TaggedFileExt};
use orbit_core::Track;
use std::path::Path;
use std::time::Duration;

/// Artist shown when a file carries no artist tag
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album shown when a file carries no album tag
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Tags read from one audio file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}

impl TrackTags {
    /// Build a local track, filling gaps with the file stem and placeholders
    pub fn into_track(self, path: &Path) -> Track {
        let title = self.title.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown".to_string())
        });

        Track::local(
            title,
            self.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            self.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            path,
        )
    }
}

/// Reads tags from a file on disk
pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<TrackTags>;
}

/// Tag reader using the lofty library
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    /// Create a new tag reader
    pub fn new() -> Self {
        Self
    }

    fn extract_from_tag(tag: &lofty::Tag, tags: &mut TrackTags) {
        let text = |key: &ItemKey| {
            tag.get_string(key)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        tags.title = text(&ItemKey::TrackTitle);
        tags.artist = text(&ItemKey::TrackArtist).or_else(|| text(&ItemKey::AlbumArtist));
        tags.album = text(&ItemKey::AlbumTitle);
    }
}

impl TagReader for LoftyTagReader {
    fn read(&self, path: &Path) -> Result<TrackTags> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let tagged_file = lofty::read_from_path(path)?;

        let duration = tagged_file.properties().duration();
        let mut tags = TrackTags {
            duration: (!duration.is_zero()).then_some(duration),
            ..TrackTags::default()
        };

        // Primary tag first, then whatever the container has
        if let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.tags().first())
        {
            Self::extract_from_tag(tag, &mut tags);
        }

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_nonexistent_file_returns_error() {
        let result = LoftyTagReader::new().read(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(MetadataError::FileNotFound(_))));
    }

    #[test]
    fn missing_tags_fall_back() {
        let track = TrackTags::default().into_track(Path::new("/music/Blue Monday.flac"));
        assert_eq!(track.title, "Blue Monday");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.album, UNKNOWN_ALBUM);
        assert_eq!(
            track.local_file().map(|f| f.path().to_path_buf()),
            Some("/music/Blue Monday.flac".into())
        );
    }

    #[test]
    fn present_tags_win() {
        let tags = TrackTags {
            title: Some("Age of Consent".into()),
            artist: Some("New Order".into()),
            album: Some("Power, Corruption & Lies".into()),
            duration: None,
        };
        let track = tags.into_track(Path::new("/music/01.mp3"));
        assert_eq!(track.title, "Age of Consent");
        assert_eq!(track.artist, "New Order");
    }
}
