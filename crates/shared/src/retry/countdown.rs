use std::time::{Duration, Instant};

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Seconds left after the decrement. Never zero.
    Remaining(u32),
    /// The tick that would have reached zero. `at` is when it was due.
    Expired { at: Instant },
}

/// One-second countdown driven by explicit deadlines.
///
/// Ticks land on a fixed cadence from `start` so a late poll never shifts
/// later ticks. The displayed value cycles `delay, delay - 1, ..., 1` and is
/// reset to `delay` on expiry instead of reaching zero.
#[derive(Debug, Clone)]
pub struct Countdown {
    delay_seconds: u32,
    remaining: u32,
    interval: Duration,
    next_tick_at: Option<Instant>,
}

impl Countdown {
    pub fn new(delay_seconds: u32, interval: Duration) -> Self {
        Self {
            delay_seconds,
            remaining: delay_seconds,
            interval,
            next_tick_at: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.remaining = self.delay_seconds;
        self.next_tick_at = Some(now + self.interval);
    }

    /// Stops ticking. The displayed value is reset so a later `start` is clean.
    pub fn cancel(&mut self) {
        self.remaining = self.delay_seconds;
        self.next_tick_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick_at.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn delay_seconds(&self) -> u32 {
        self.delay_seconds
    }

    pub fn next_tick_at(&self) -> Option<Instant> {
        self.next_tick_at
    }

    /// Applies at most one due tick. Call repeatedly to catch up.
    pub fn poll(&mut self, now: Instant) -> Option<CountdownTick> {
        let due = self.next_tick_at?;
        if now < due {
            return None;
        }

        if self.remaining <= 1 {
            self.remaining = self.delay_seconds;
            self.next_tick_at = None;
            return Some(CountdownTick::Expired { at: due });
        }

        self.remaining -= 1;
        self.next_tick_at = Some(due + self.interval);
        Some(CountdownTick::Remaining(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn idle_countdown_never_ticks() {
        let start = Instant::now();
        let mut countdown = Countdown::new(3, SECOND);
        assert!(!countdown.is_running());
        assert_eq!(countdown.poll(start + SECOND * 10), None);
        assert_eq!(countdown.remaining(), 3);
    }

    #[test]
    fn counts_down_then_expires_without_reaching_zero() {
        let start = Instant::now();
        let mut countdown = Countdown::new(3, SECOND);
        countdown.start(start);

        assert_eq!(countdown.poll(start + Duration::from_millis(999)), None);
        assert_eq!(
            countdown.poll(start + SECOND),
            Some(CountdownTick::Remaining(2))
        );
        assert_eq!(
            countdown.poll(start + SECOND * 2),
            Some(CountdownTick::Remaining(1))
        );
        assert_eq!(
            countdown.poll(start + SECOND * 3),
            Some(CountdownTick::Expired {
                at: start + SECOND * 3
            })
        );
        assert_eq!(countdown.remaining(), 3);
        assert!(!countdown.is_running());
    }

    #[test]
    fn late_poll_catches_up_one_tick_at_a_time() {
        let start = Instant::now();
        let mut countdown = Countdown::new(5, SECOND);
        countdown.start(start);

        let late = start + Duration::from_millis(2_500);
        assert_eq!(countdown.poll(late), Some(CountdownTick::Remaining(4)));
        assert_eq!(countdown.poll(late), Some(CountdownTick::Remaining(3)));
        assert_eq!(countdown.poll(late), None);
        assert_eq!(countdown.next_tick_at(), Some(start + SECOND * 3));
    }

    #[test]
    fn cancel_drops_pending_tick() {
        let start = Instant::now();
        let mut countdown = Countdown::new(3, SECOND);
        countdown.start(start);
        countdown.poll(start + SECOND);
        countdown.cancel();

        assert_eq!(countdown.poll(start + SECOND * 5), None);
        assert_eq!(countdown.remaining(), 3);
    }

    #[test]
    fn single_second_delay_expires_on_first_tick() {
        let start = Instant::now();
        let mut countdown = Countdown::new(1, SECOND);
        countdown.start(start);
        assert!(matches!(
            countdown.poll(start + SECOND),
            Some(CountdownTick::Expired { .. })
        ));
    }
}
