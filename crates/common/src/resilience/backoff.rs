//! Exponential backoff between retry attempts.

use std::time::Duration;

/// Delay to wait after the attempt at `attempt_index` (0-based) failed.
///
/// `base × 2^attempt_index`, without jitter or cap. Arithmetic saturates
/// instead of overflowing; callers bound total delay with their retry count.
pub fn backoff_delay(base: Duration, attempt_index: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt_index))
}

/// The full delay schedule for `max_retries` retries.
pub fn backoff_schedule(base: Duration, max_retries: u32) -> impl Iterator<Item = Duration> {
    (0..max_retries).map(move |attempt_index| backoff_delay(base, attempt_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_from_base() {
        let base = Duration::from_millis(200);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(800));
        assert_eq!(backoff_delay(base, 5), Duration::from_millis(6_400));
    }

    #[test]
    fn schedule_has_one_delay_per_retry() {
        let delays: Vec<_> = backoff_schedule(Duration::from_millis(200), 3).collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(200), Duration::from_millis(400), Duration::from_millis(800)]
        );
        assert_eq!(backoff_schedule(Duration::from_millis(200), 0).count(), 0);
    }

    #[test]
    fn zero_base_never_waits() {
        assert_eq!(backoff_delay(Duration::ZERO, 10), Duration::ZERO);
    }

    #[test]
    fn huge_attempt_index_saturates() {
        assert_eq!(backoff_delay(Duration::from_secs(1), 200), Duration::from_secs(u64::from(u32::MAX)));
        assert_eq!(backoff_delay(Duration::MAX, 1), Duration::MAX);
    }
}
