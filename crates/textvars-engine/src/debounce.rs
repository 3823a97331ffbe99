//! Latest-wins debouncing for selection events.
//!
//! Every [`Debouncer::push`] replaces the pending value and restarts the
//! quiet interval. The value only comes out of [`Debouncer::poll`] once no
//! new value has arrived for the whole interval. Time is always passed in,
//! so callers decide what "now" is.

use std::time::{Duration, Instant};

/// Default quiet interval before a selection change is acted on.
pub const SELECTION_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replaces any pending value and restarts the quiet interval.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Takes the pending value once it has been quiet long enough.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.quiet)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value regardless of the interval.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Duration::from_millis(SELECTION_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn value_waits_for_quiet_interval() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(200));

        debouncer.push("a", start);
        assert_eq!(debouncer.deadline(), Some(start + ms(200)));
        assert_eq!(debouncer.poll(start + ms(199)), None);
        assert_eq!(debouncer.poll(start + ms(200)), Some("a"));
        assert_eq!(debouncer.poll(start + ms(500)), None);
    }

    #[test]
    fn rapid_pushes_coalesce_to_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(200));

        debouncer.push("a", start);
        debouncer.push("b", start + ms(150));
        debouncer.push("c", start + ms(300));

        // Each push restarts the interval
        assert_eq!(debouncer.poll(start + ms(400)), None);
        assert_eq!(debouncer.poll(start + ms(500)), Some("c"));
    }

    #[test]
    fn flush_ignores_the_interval() {
        let mut debouncer = Debouncer::<u8>::default();
        assert_eq!(debouncer.quiet(), ms(SELECTION_DEBOUNCE_MS));

        debouncer.push(1, Instant::now());
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.flush(), Some(1));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.deadline(), None);
    }
}
