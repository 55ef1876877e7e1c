//! Polling schedule for a comment list that may not be rendered yet.
//!
//! | Attempt failed | Wait before next attempt |
//! |----------------|--------------------------|
//! | 1 ..= 9        | 250ms × attempt          |
//! | 10             | 10s (slow, very long threads) |
//! | 11             | give up                  |

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts that use the scaled delay; the last of them is followed by
    /// `final_delay` instead.
    pub max_attempts: u32,
    /// Delay unit, multiplied by the attempt number.
    pub base_delay: Duration,
    /// Wait before the single extra attempt after `max_attempts`.
    pub final_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(250),
            final_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// How long to wait after `attempt` (1-based) found nothing, or `None`
    /// once the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt < self.max_attempts {
            Some(self.base_delay * attempt)
        } else if attempt == self.max_attempts {
            Some(self.final_delay)
        } else {
            None
        }
    }

    /// Upper bound on fetches: the scaled attempts plus the final one.
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts + 1
    }

    /// Worst-case time spent waiting before giving up.
    pub fn total_wait(&self) -> Duration {
        (1..=self.max_attempts).filter_map(|a| self.delay_after(a)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_scale_linearly_then_extend() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(9), Some(Duration::from_millis(2250)));
        assert_eq!(policy.delay_after(10), Some(Duration::from_secs(10)));
        assert_eq!(policy.delay_after(11), None);
    }

    #[test]
    fn budget_totals() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_attempts(), 11);
        // 250ms * (1 + .. + 9) + 10s
        assert_eq!(policy.total_wait(), Duration::from_millis(11_250 + 10_000));
    }

    #[test]
    fn zero_budget_gives_up_immediately() {
        let policy = RetryPolicy { max_attempts: 0, ..RetryPolicy::default() };
        assert_eq!(policy.delay_after(1), None);
    }
}
