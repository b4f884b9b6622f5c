//! Coalescing one-shot timer used by the save policy.
//!
//! A [`Debouncer`] does not own a thread or a callback. It owns a deadline and
//! the most recent arguments; the event loop asks it for due work with
//! [`Debouncer::take_due`] on every tick, the same way the rest of the UI is
//! driven from idle ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    deadline: Option<Instant>,
    args: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            args: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `args` and restart the delay, replacing whatever was pending.
    pub fn call(&mut self, args: T, now: Instant) {
        self.args = Some(args);
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending invocation without running it. Returns whether one
    /// was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline = None;
        self.args.take().is_some()
    }

    /// Hand out the pending invocation immediately, regardless of the
    /// deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.args.take()
    }

    /// Hand out the pending invocation if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.args.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn bursts_collapse_to_last_args() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        for i in 0..5u64 {
            d.call(i, t0 + Duration::from_millis(50 * i));
        }
        let last_call = t0 + Duration::from_millis(200);
        assert_eq!(d.take_due(last_call + Duration::from_millis(499)), None);
        assert_eq!(d.take_due(last_call + DELAY), Some(4));
        assert_eq!(d.take_due(last_call + DELAY * 2), None);
    }

    #[test]
    fn cancel_discards_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        assert!(!d.cancel());
        d.call("a", t0);
        assert!(d.cancel());
        assert!(!d.is_pending());
        assert_eq!(d.take_due(t0 + DELAY * 4), None);
    }

    #[test]
    fn flush_runs_early_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.call(7, t0);
        assert_eq!(d.flush(), Some(7));
        assert_eq!(d.flush(), None);
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn each_call_restarts_the_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.call(1, t0);
        d.call(2, t0 + Duration::from_millis(400));
        assert_eq!(d.take_due(t0 + Duration::from_millis(600)), None);
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(900)));
    }
}
