/// Local file source resolution for the shell
///
/// The simulated element never reads audio bytes, so there is no point in
/// inlining files as data URLs. The decoder only checks the file is still
/// there and hands back a `file://` URL.
use async_trait::async_trait;
use orbit_core::LocalFile;
use orbit_playback::{FileDecoder, PlaybackError, PlaybackSource};
use std::path::Path;
use tracing::debug;

/// `file://` URL for a path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileUrlDecoder;

#[async_trait]
impl FileDecoder for FileUrlDecoder {
    async fn decode(&self, file: &LocalFile) -> orbit_playback::Result<PlaybackSource> {
        let metadata = tokio::fs::metadata(file.path()).await?;
        if !metadata.is_file() {
            return Err(PlaybackError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", file.path().display()),
            )));
        }

        debug!(path = %file.path().display(), "Resolved local file");
        Ok(PlaybackSource::new(file_url(file.path())))
    }
}
