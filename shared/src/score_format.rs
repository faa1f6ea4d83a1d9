//! Display helpers for raw leaderboard scores.
//!
//! Scores are stored as integer milliseconds and rendered as `M:SS.mmm`:
//! minutes unpadded, seconds padded to two digits, milliseconds to three.

/// Formats a millisecond duration as `M:SS.mmm`.
pub fn format_score(ms: u64) -> String {
    let millis = ms % 1000;
    let seconds = (ms / 1000) % 60;
    let minutes = ms / 60_000;
    format!("{}:{:02}.{:03}", minutes, seconds, millis)
}

/// Formats a score as read from storage. Negative values have no time
/// representation and yield `None`.
pub fn format_stored_score(score: i64) -> Option<String> {
    u64::try_from(score).ok().map(format_score)
}
