/// Audio file discovery
use crate::error::{MetadataError, Result};
use crate::reader::{LoftyTagReader, TagReader, TrackTags};
use orbit_core::Track;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Accepted file extensions, lowercase without the dot
    pub extensions: Vec<String>,

    /// Descend into directories (default: true)
    pub recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_extensions(["mp3", "m4a", "flac", "wav", "aac"])
    }
}

impl ScanConfig {
    /// Narrower set offered when a whole directory is picked
    pub fn directory_picker() -> Self {
        Self::with_extensions(["mp3", "wav", "aac"])
    }

    pub fn with_extensions<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            recursive: true,
        }
    }

    /// Check if file is a supported audio format
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|e| self.extensions.contains(&e))
    }
}

/// A discovered track plus what the tags said about its length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTrack {
    pub track: Track,
    pub duration: Option<Duration>,
}

/// Scan progress updates
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Discovery finished
    Started { total_files: usize },

    /// One file read
    FileScanned {
        path: PathBuf,
        error: Option<String>,
    },

    /// Scanning completed
    Completed { tracks: usize },
}

/// Result of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Tracks in discovery order
    pub tracks: Vec<ScannedTrack>,

    /// Files whose tags could not be read; they are still listed in
    /// `tracks` with fallback tags
    pub tag_errors: Vec<(PathBuf, String)>,
}

impl ScanReport {
    /// Just the tracks, ready to add to a playlist
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks.into_iter().map(|s| s.track).collect()
    }
}

/// Turns files and directories into tracks
pub struct TrackScanner<R: TagReader = LoftyTagReader> {
    reader: Arc<R>,
    config: ScanConfig,
}

impl TrackScanner<LoftyTagReader> {
    /// Create a scanner with the lofty reader and default extensions
    pub fn new() -> Self {
        Self::with_config(LoftyTagReader::new(), ScanConfig::default())
    }
}

impl Default for TrackScanner<LoftyTagReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TagReader + 'static> TrackScanner<R> {
    /// Create a scanner with custom reader and configuration
    pub fn with_config(reader: R, config: ScanConfig) -> Self {
        Self {
            reader: Arc::new(reader),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Collect supported files from `paths`
    ///
    /// Files are taken as given when their extension matches. Directories are
    /// walked and their entries sorted by path. A missing path is an error.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if !path.exists() {
                return Err(MetadataError::FileNotFound(path.display().to_string()));
            }

            if path.is_file() {
                if self.config.accepts(path) {
                    files.push(path.clone());
                } else {
                    debug!(path = %path.display(), "Skipping unsupported file");
                }
                continue;
            }

            let max_depth = if self.config.recursive { usize::MAX } else { 1 };
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
                .follow_links(false)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && self.config.accepts(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            files.extend(found);
        }

        Ok(files)
    }

    /// Discover and read every file under `paths`
    ///
    /// Tag reading runs on the blocking pool. Progress is reported on
    /// `progress_tx` if given.
    pub async fn scan(
        &self,
        paths: &[PathBuf],
        progress_tx: Option<mpsc::Sender<ScanProgress>>,
    ) -> Result<ScanReport> {
        let files = self.discover(paths)?;
        info!(files = files.len(), "Scanning audio files");

        if let Some(ref tx) = progress_tx {
            let _ = tx
                .send(ScanProgress::Started {
                    total_files: files.len(),
                })
                .await;
        }

        let mut report = ScanReport::default();
        for path in files {
            let reader = Arc::clone(&self.reader);
            let read_path = path.clone();
            // Unreadable tags are not fatal; the track falls back to its file name
            let (tags, error) =
                tokio::task::spawn_blocking(move || match reader.read(&read_path) {
                    Ok(tags) => (tags, None),
                    Err(err) => (TrackTags::default(), Some(err.to_string())),
                })
                .await
                .map_err(|e| MetadataError::Task(e.to_string()))?;

            if let Some(ref message) = error {
                warn!(path = %path.display(), %message, "Failed to read tags");
                report.tag_errors.push((path.clone(), message.clone()));
            }

            let duration = tags.duration;
            report.tracks.push(ScannedTrack {
                track: tags.into_track(&path),
                duration,
            });

            if let Some(ref tx) = progress_tx {
                let _ = tx.send(ScanProgress::FileScanned { path, error }).await;
            }
        }

        if let Some(ref tx) = progress_tx {
            let _ = tx
                .send(ScanProgress::Completed {
                    tracks: report.tracks.len(),
                })
                .await;
        }

        Ok(report)
    }
}
