//! Millisecond clock helpers
//!
//! The terminal clock is a free-running `u32` millisecond counter that wraps
//! roughly every 49.7 days. Elapsed time is only defined while the counter
//! has not wrapped past the start point; callers decide what to do when it
//! has.

/// Milliseconds since boot, wrapping
pub type Millis = u32;

/// Milliseconds in one minute
pub const MINUTE_MS: Millis = 60 * 1000;

/// Convert whole minutes to milliseconds
pub const fn minutes(min: u32) -> Millis {
    min * MINUTE_MS
}

/// Time elapsed from `start` to `now`
///
/// Returns `None` if `now < start`, meaning the counter wrapped.
pub const fn elapsed(start: Millis, now: Millis) -> Option<Millis> {
    now.checked_sub(start)
}
