use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const HOURS_PER_DAY: u64 = 24;

/// Formats a duration as a coarse human phrase, like "3 minutes" or "About an hour".
pub fn human_duration(d: Duration) -> String {
    let seconds = d.as_secs();
    let minutes = seconds / MINUTE;
    let hours = seconds / HOUR;

    if seconds < 1 {
        "Less than a second".to_string()
    } else if seconds < MINUTE {
        format!("{} seconds", seconds)
    } else if minutes == 1 {
        "About a minute".to_string()
    } else if minutes < 60 {
        format!("{} minutes", minutes)
    } else if hours == 1 {
        "About an hour".to_string()
    } else if hours < 48 {
        format!("{} hours", hours)
    } else if hours < HOURS_PER_DAY * 7 * 2 {
        format!("{} days", hours / HOURS_PER_DAY)
    } else if hours < HOURS_PER_DAY * 30 * 3 {
        format!("{} weeks", hours / HOURS_PER_DAY / 7)
    } else if hours < HOURS_PER_DAY * 365 * 2 {
        format!("{} months", hours / HOURS_PER_DAY / 30)
    } else {
        format!("{} years", hours / HOURS_PER_DAY / 365)
    }
}
