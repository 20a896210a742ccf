/// Text rendering for the prompt
use orbit_core::Track;
use orbit_playback::{PlayerStatus, StoreSnapshot};
use std::fmt::Write;
use std::time::Duration;

/// `MM:SS`, minutes are not wrapped into hours
pub fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn describe(track: &Track) -> String {
    format!("{} - {}", track.artist, track.title)
}

/// One line per playlist entry, current entry marked with `>`
pub fn format_playlist(snapshot: &StoreSnapshot) -> String {
    if snapshot.playlist.is_empty() {
        return "playlist is empty".to_string();
    }

    let mut out = String::new();
    for (index, id) in snapshot.playlist.iter().enumerate() {
        let marker = if snapshot.current_track == Some(index) {
            '>'
        } else {
            ' '
        };
        let label = snapshot
            .tracks
            .get(id)
            .map_or_else(|| format!("<missing {id}>"), describe);
        let _ = writeln!(out, "{marker} {:>3}. {label}", index + 1);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Single status line
pub fn format_status(status: &PlayerStatus) -> String {
    let total = status.snapshot.playlist.len();
    match (&status.current_track, status.current_index) {
        (Some(track), Some(index)) => format!(
            "[{}] {} {}/{} {} (repeat {})",
            status.phase.as_str(),
            format_time(status.position),
            index + 1,
            total,
            describe(track),
            status.repeat
        ),
        _ => format!(
            "[{}] nothing selected, {total} in playlist (repeat {})",
            status.phase.as_str(),
            status.repeat
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_has_two_digit_fields() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_millis(65_900)), "01:05");
    }

    #[test]
    fn minutes_do_not_wrap() {
        assert_eq!(format_time(Duration::from_secs(6000)), "100:00");
    }
}
