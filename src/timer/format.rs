/// Billable seconds after paused time is taken out, floored at zero.
pub fn billable_seconds(raw_elapsed_secs: i64, pause_secs: i64) -> i64 {
    raw_elapsed_secs.saturating_sub(pause_secs).max(0)
}

/// Renders a duration as `HH:MM:SS`. Hours keep growing past 24; negative
/// input renders as zero.
pub fn format_hms(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
