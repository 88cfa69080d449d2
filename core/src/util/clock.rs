/// Source of wall-clock time for snapshot stamps.
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch milliseconds.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Stamp for a new snapshot version: the clock reading, bumped past the
/// previous stamp when the clock has not advanced.
pub fn next_stamp(now: i64, previous: Option<i64>) -> i64 {
    match previous {
        Some(prev) if now <= prev => prev.saturating_add(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stamp_uses_clock_when_ahead() {
        assert_eq!(next_stamp(200, Some(100)), 200);
        assert_eq!(next_stamp(200, None), 200);
    }

    #[test]
    fn next_stamp_bumps_when_clock_stalls_or_goes_back() {
        assert_eq!(next_stamp(100, Some(100)), 101);
        assert_eq!(next_stamp(50, Some(100)), 101);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
