// src/politeness.rs
// =============================================================================
// Random delays between network requests.
//
// The listing API throttles clients that hit it at a steady machine rate, so
// after every search request and every cache-miss detail fetch we sleep for a
// random duration between `min` and `max`. Cache hits never sleep.
// =============================================================================

use rand::Rng;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    min: Duration,
    max: Duration,
}

impl Politeness {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all. Used by tests and for local mirrors of the API.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Picks a delay uniformly in `[min, max]` at millisecond resolution.
    pub fn pick_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min == max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    pub async fn pause(&self) {
        if self.is_disabled() {
            return;
        }
        let delay = self.pick_delay();
        trace!(?delay, "politeness delay");
        tokio::time::sleep(delay).await;
    }
}

impl Default for Politeness {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let politeness = Politeness::default();
        for _ in 0..200 {
            let delay = politeness.pick_delay();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(3));
        }
    }

    #[test]
    fn test_swapped_bounds() {
        let politeness = Politeness::new(Duration::from_millis(50), Duration::from_millis(10));
        let delay = politeness.pick_delay();
        assert!(delay >= Duration::from_millis(10) && delay <= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_disabled_returns_immediately() {
        let politeness = Politeness::disabled();
        assert!(politeness.is_disabled());

        let started = std::time::Instant::now();
        politeness.pause().await;
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
