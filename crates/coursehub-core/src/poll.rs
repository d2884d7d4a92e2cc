//! Bookkeeping shared by the periodic checkers.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Shortest period a checker's timer will run at.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Timer for a periodic checker. A zero period is raised to [`MIN_TICK`];
/// late ticks push the schedule back instead of bursting.
pub fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period.max(MIN_TICK));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Per-checker timing and failure-suppression state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    /// When the last real check ran.
    pub last_checked_at: Option<Instant>,
    /// Set once a failure has been surfaced; cleared on recovery.
    pub suppressed: bool,
}

impl PollState {
    /// Whether at least `interval` has passed since the last check.
    pub fn is_due(&self, interval: Duration, now: Instant) -> bool {
        match self.last_checked_at {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        }
    }

    /// Record that a check ran at `now`.
    pub fn mark_checked(&mut self, now: Instant) {
        self.last_checked_at = Some(now);
    }

    /// Enter the suppressed state. Returns `true` only on the transition,
    /// i.e. when the caller should surface the failure.
    pub fn suppress(&mut self) -> bool {
        !std::mem::replace(&mut self.suppressed, true)
    }

    /// Leave the suppressed state. Returns `true` if it was suppressed.
    pub fn recover(&mut self) -> bool {
        std::mem::replace(&mut self.suppressed, false)
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_due_respects_interval() {
        let mut state = PollState::default();
        let interval = Duration::from_secs(30);
        assert!(state.is_due(interval, Instant::now()));

        state.mark_checked(Instant::now());
        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!state.is_due(interval, Instant::now()));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(state.is_due(interval, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_tolerates_zero_period() {
        let mut ticker = ticker(Duration::ZERO);
        assert_eq!(ticker.period(), MIN_TICK);
        ticker.tick().await;
        ticker.tick().await;
    }

    #[test]
    fn test_suppress_reports_only_first_transition() {
        let mut state = PollState::default();
        assert!(state.suppress());
        assert!(!state.suppress());
        assert!(state.recover());
        assert!(!state.recover());
        assert!(state.suppress());
    }
}
