use super::model::Track;

/// Join artist names with ` & `, skipping blank entries.
pub fn format_artists(artists: &[String]) -> String {
    artists
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<&str>>()
        .join(" & ")
}

/// Format a duration in milliseconds as `M:SS`, or `H:MM:SS` from one hour up.
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    let s = secs % 60;
    let m = (secs / 60) % 60;
    let h = secs / 3600;
    if h == 0 {
        format!("{}:{:02}", m, s)
    } else {
        format!("{}:{:02}:{:02}", h, m, s)
    }
}

/// Render a track into the four listing columns: name, artists, album, duration.
pub fn track_columns(track: &Track) -> [String; 4] {
    [
        track.name.clone(),
        format_artists(&track.artists),
        track.album.clone(),
        format_duration(track.duration_ms),
    ]
}
