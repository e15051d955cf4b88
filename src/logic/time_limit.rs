//! Time attack duration from the map's author time.

/// Base seconds to play on a time attack map.
pub const TA_BASE_TIME: u32 = 60;
/// One extra minute per this many seconds of author time.
pub const TA_TIME_DIVIDER: u32 = 5;
/// Mode setting that carries the time limit, in seconds.
pub const TIME_LIMIT_SETTING: &str = "S_TimeLimit";

/// `base + floor(author_seconds / divider) * 60`. A zero divider is treated as 1.
pub fn qualification_time_limit(author_time_ms: u32, base_seconds: u32, divider: u32) -> u32 {
    let author_seconds = author_time_ms / 1000;
    let extra_minutes = author_seconds / divider.max(1);
    base_seconds.saturating_add(extra_minutes.saturating_mul(60))
}
