use chrono::{DateTime, Utc};

/// Current wall-clock time, clamped so it never runs before `last`.
///
/// Entry timestamps must be monotonically non-decreasing across the chain
/// even if the system clock steps backwards between appends.
pub fn monotonic_now(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(prev) if now < prev => prev,
        _ => now,
    }
}
