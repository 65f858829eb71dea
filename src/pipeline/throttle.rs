//! Inter-call pacing
//!
//! The pipeline issues one network operation at a time; the only scheduling
//! control is a fixed pause between calls. The delay computation is pure and
//! takes the current instant as an argument, so tests drive it with
//! synthetic clocks instead of sleeping.

use std::time::{Duration, Instant};

/// Fixed-interval pacing between successive remote calls
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_allowed: Option<Instant>,
}

impl Throttle {
    /// Create a throttle with the given minimum spacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: None,
        }
    }

    /// How long to wait at `now` before the next call may go out.
    ///
    /// The first call is never delayed. Each call schedules the following
    /// one, so invoke this exactly once per operation.
    pub fn next_delay(&mut self, now: Instant) -> Duration {
        let delay = match self.next_allowed {
            Some(at) => at.saturating_duration_since(now),
            None => Duration::ZERO,
        };
        self.next_allowed = Some(now + delay + self.interval);
        delay
    }

    /// Sleep until the next call is allowed.
    pub async fn pause(&mut self) {
        let delay = self.next_delay(Instant::now());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(2);

    #[test]
    fn test_first_call_is_immediate() {
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.next_delay(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_back_to_back_calls_wait_full_interval() {
        let mut throttle = Throttle::new(INTERVAL);
        let start = Instant::now();

        assert_eq!(throttle.next_delay(start), Duration::ZERO);
        assert_eq!(throttle.next_delay(start), INTERVAL);
    }

    #[test]
    fn test_elapsed_time_counts_toward_delay() {
        let mut throttle = Throttle::new(INTERVAL);
        let start = Instant::now();

        throttle.next_delay(start);
        let delay = throttle.next_delay(start + Duration::from_millis(500));
        assert_eq!(delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_slow_operations_are_not_delayed() {
        let mut throttle = Throttle::new(INTERVAL);
        let start = Instant::now();

        throttle.next_delay(start);
        let delay = throttle.next_delay(start + Duration::from_secs(5));
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn test_spacing_is_maintained_across_catch_up() {
        let mut throttle = Throttle::new(INTERVAL);
        let start = Instant::now();

        // First call dispatches at t=0
        assert_eq!(throttle.next_delay(start), Duration::ZERO);
        // Second asks at t=0.1, is told to dispatch at t=2.1
        assert_eq!(
            throttle.next_delay(start + Duration::from_millis(100)),
            Duration::from_secs(2) - Duration::from_millis(100)
        );
        // Third asks at t=2.1, just after the second dispatched at t=2.0,
        // and must wait until t=4.0
        assert_eq!(
            throttle.next_delay(start + Duration::from_millis(2100)),
            Duration::from_millis(1900)
        );
    }
}
