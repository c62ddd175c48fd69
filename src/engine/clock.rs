//! Turn timing math.
//!
//! Remaining time is always a pure function of two server timestamps, never a
//! stored countdown, so every observer derives the same value regardless of
//! local clock drift.

use std::time::{Duration, SystemTime};

/// Seconds left in a turn that started at `turn_start` and runs for
/// `round_length_seconds`. Clamped at zero, never negative.
pub fn remaining_seconds(
    round_length_seconds: u32,
    turn_start: SystemTime,
    now: SystemTime,
) -> u64 {
    let elapsed = now
        .duration_since(turn_start)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    u64::from(round_length_seconds).saturating_sub(elapsed)
}

/// Apply the skip penalty by shifting the turn's start time backwards. This
/// keeps "remaining time" derivable from the same two timestamps instead of
/// introducing a separately tracked countdown.
pub fn penalized_start(turn_start: SystemTime, skip_penalty_seconds: u32) -> SystemTime {
    turn_start - Duration::from_secs(u64::from(skip_penalty_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_counts_down_with_elapsed_time() {
        let start = SystemTime::UNIX_EPOCH;
        let now = start + Duration::from_secs(25);
        assert_eq!(remaining_seconds(60, start, now), 35);
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let start = SystemTime::UNIX_EPOCH;
        let now = start + Duration::from_secs(90);
        assert_eq!(remaining_seconds(60, start, now), 0);
    }

    #[test]
    fn remaining_tolerates_clock_going_backwards() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let now = SystemTime::UNIX_EPOCH;
        assert_eq!(remaining_seconds(60, start, now), 60);
    }

    #[test]
    fn penalty_shifts_start_backwards() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let shifted = penalized_start(start, 10);
        assert_eq!(shifted, SystemTime::UNIX_EPOCH + Duration::from_secs(90));

        let now = start + Duration::from_secs(20);
        assert_eq!(remaining_seconds(60, shifted, now), 30);
    }
}
