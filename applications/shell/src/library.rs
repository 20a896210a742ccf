//! Turning command-line items into playable tracks

use crate::decoder::file_url;
use crate::element::LengthTable;
use crate::error::Result;
use orbit_core::Track;
use orbit_metadata::{ScanProgress, TrackScanner, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Track for a remote stream, titled after the last URL segment
pub fn remote_track(url: &str) -> Track {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest
        .split(['?', '#'])
        .next()
        .unwrap_or(rest)
        .trim_end_matches('/');

    let title = match rest.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => match segment.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => segment,
        },
        _ => rest,
    };
    let title = if title.is_empty() { url } else { title };

    Track::remote(title, UNKNOWN_ARTIST, UNKNOWN_ALBUM, url)
}

/// Scan local paths and wrap URLs, in that order
///
/// Known durations of scanned files are recorded in `lengths` under the URL
/// the shell's decoder will hand the element.
pub async fn gather(
    scanner: &TrackScanner,
    paths: &[PathBuf],
    urls: &[String],
    lengths: &LengthTable,
) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();

    if !paths.is_empty() {
        let (tx, mut rx) = mpsc::channel(64);
        let progress = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                match update {
                    ScanProgress::Started { total_files } => {
                        info!(total_files, "Scanning");
                    }
                    ScanProgress::FileScanned {
                        path,
                        error: Some(error),
                    } => debug!(path = %path.display(), %error, "Scanned with fallback tags"),
                    ScanProgress::FileScanned { path, .. } => {
                        debug!(path = %path.display(), "Scanned");
                    }
                    ScanProgress::Completed { tracks } => info!(tracks, "Scan finished"),
                }
            }
        });

        let report = scanner.scan(paths, Some(tx)).await;
        // Progress logging ends with the sender
        let _ = progress.await;
        let report = report?;

        for scanned in report.tracks {
            if let (Some(file), Some(duration)) = (scanned.track.local_file(), scanned.duration) {
                lengths.insert(file_url(file.path()), duration);
            }
            tracks.push(scanned.track);
        }
    }

    tracks.extend(urls.iter().map(|url| remote_track(url)));
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_title_from_last_segment() {
        let track = remote_track("https://cdn.example/music/rhyme.mp3?token=1");
        assert_eq!(track.title, "rhyme");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(
            track.remote_url(),
            Some("https://cdn.example/music/rhyme.mp3?token=1")
        );
    }

    #[test]
    fn bare_host_keeps_whole_url() {
        let track = remote_track("https://radio.example/");
        assert_eq!(track.title, "radio.example");

        let track = remote_track("https://");
        assert_eq!(track.title, "https://");
    }
}
