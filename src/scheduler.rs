use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickRate {
    Normal,
    Fast,
}

/// Fires one simulation step per interval. Late polls never owe extra
/// steps: the next deadline is measured from the fire that just happened.
pub(crate) struct TickScheduler {
    normal: Duration,
    fast: Duration,
    rate: TickRate,
    next_due: Instant,
}

impl TickScheduler {
    pub(crate) fn new(normal: Duration, fast: Duration, now: Instant) -> Self {
        Self {
            normal,
            fast,
            rate: TickRate::Normal,
            next_due: now + normal,
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        match self.rate {
            TickRate::Normal => self.normal,
            TickRate::Fast => self.fast,
        }
    }

    pub(crate) fn rate(&self) -> TickRate {
        self.rate
    }

    pub(crate) fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval();
        true
    }

    /// Switching rate restarts the timer at the new interval.
    pub(crate) fn set_rate(&mut self, rate: TickRate, now: Instant) -> bool {
        if rate == self.rate {
            return false;
        }
        self.rate = rate;
        self.next_due = now + self.interval();
        true
    }

    pub(crate) fn until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut s = TickScheduler::new(ms(1000), ms(100), t0);
        assert!(!s.poll(t0));
        assert!(!s.poll(t0 + ms(999)));
        assert!(s.poll(t0 + ms(1000)));
        assert!(!s.poll(t0 + ms(1500)));
        assert!(s.poll(t0 + ms(2000)));
    }

    #[test]
    fn late_poll_does_not_batch_steps() {
        let t0 = Instant::now();
        let mut s = TickScheduler::new(ms(1000), ms(100), t0);
        let late = t0 + ms(5300);
        assert!(s.poll(late));
        assert!(!s.poll(late));
        assert_eq!(s.until_due(late), ms(1000));
        assert!(s.poll(late + ms(1000)));
    }

    #[test]
    fn fast_rate_for_cleaning_and_back() {
        let t0 = Instant::now();
        let mut s = TickScheduler::new(ms(1000), ms(100), t0);
        assert!(s.set_rate(TickRate::Fast, t0 + ms(10)));
        assert!(!s.set_rate(TickRate::Fast, t0 + ms(20)));
        assert_eq!(s.interval(), ms(100));
        assert!(!s.poll(t0 + ms(100)));
        assert!(s.poll(t0 + ms(110)));
        assert!(s.poll(t0 + ms(210)));

        assert!(s.set_rate(TickRate::Normal, t0 + ms(210)));
        assert_eq!(s.rate(), TickRate::Normal);
        assert!(!s.poll(t0 + ms(1209)));
        assert!(s.poll(t0 + ms(1210)));
    }
}
