use std::time::Instant;

use tracing::debug;

use super::RetryConfig;
use super::countdown::{Countdown, CountdownTick};

/// Where a session sits in the retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Idle,
    CountingDown,
    Retrying,
    PermanentFailure,
}

/// What the pending settle delay leads to once it elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleKind {
    /// Countdown expiry or "Retry Now": counts as an attempt.
    Attempt,
    /// "Try Again" after exhausting attempts: the counter was already reset.
    Restart,
}

#[derive(Debug, Clone, Copy)]
struct Settle {
    at: Instant,
    kind: SettleKind,
}

/// Result of applying one due deadline to a session.
pub(crate) enum SessionStep {
    Ticked,
    RetryDue,
}

/// Retry state for one displayed error.
///
/// Every timer the session depends on lives inside it as a deadline, so
/// dropping or replacing the session cancels them.
#[derive(Debug, Clone)]
pub struct RetrySession {
    id: u64,
    attempt_count: u32,
    max_attempts: u32,
    countdown: Countdown,
    is_permanent_failure: bool,
    settle: Option<Settle>,
    last_error_message: Option<String>,
}

impl RetrySession {
    pub(crate) fn start(id: u64, message: String, config: &RetryConfig, now: Instant) -> Self {
        let mut countdown = Countdown::new(config.retry_delay_seconds, config.tick_interval);
        countdown.start(now);
        Self {
            id,
            attempt_count: 0,
            max_attempts: config.max_attempts,
            countdown,
            is_permanent_failure: false,
            settle: None,
            last_error_message: Some(message),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn countdown(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn retry_delay_seconds(&self) -> u32 {
        self.countdown.delay_seconds()
    }

    pub fn is_permanent_failure(&self) -> bool {
        self.is_permanent_failure
    }

    pub fn is_retrying(&self) -> bool {
        self.settle.is_some()
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error_message.as_deref()
    }

    pub fn phase(&self) -> RetryPhase {
        if self.settle.is_some() {
            RetryPhase::Retrying
        } else if self.is_permanent_failure {
            RetryPhase::PermanentFailure
        } else {
            RetryPhase::CountingDown
        }
    }

    /// 1-based attempt ordinal shown to the user, capped at `max_attempts`.
    pub fn display_attempt(&self) -> u32 {
        self.attempt_count.saturating_add(1).min(self.max_attempts)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.settle {
            Some(settle) => Some(settle.at),
            None => self.countdown.next_tick_at(),
        }
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_error_message = Some(message);
    }

    /// Skips the rest of the countdown. Only valid while counting down.
    pub(crate) fn retry_now(&mut self, config: &RetryConfig, now: Instant) -> bool {
        if self.phase() != RetryPhase::CountingDown {
            return false;
        }
        self.countdown.cancel();
        self.settle = Some(Settle {
            at: now + config.settle_delay,
            kind: SettleKind::Attempt,
        });
        debug!(session_id = self.id, attempt = self.attempt_count, "manual retry requested");
        true
    }

    /// Resets an exhausted session. Only valid in permanent failure.
    pub(crate) fn restart(&mut self, config: &RetryConfig, now: Instant) -> bool {
        if self.phase() != RetryPhase::PermanentFailure {
            return false;
        }
        self.attempt_count = 0;
        self.is_permanent_failure = false;
        self.countdown = Countdown::new(config.retry_delay_seconds, config.tick_interval);
        self.max_attempts = config.max_attempts;
        self.settle = Some(Settle {
            at: now + config.settle_delay,
            kind: SettleKind::Restart,
        });
        debug!(session_id = self.id, "retry session restarted after permanent failure");
        true
    }

    /// Rebuilds the countdown for new settings. A running countdown restarts
    /// from the new delay at `now`.
    pub(crate) fn reconfigure(&mut self, config: &RetryConfig, now: Instant) {
        let was_running = self.countdown.is_running();
        self.countdown = Countdown::new(config.retry_delay_seconds, config.tick_interval);
        self.max_attempts = config.max_attempts;
        self.attempt_count = self.attempt_count.min(self.max_attempts);

        if self.settle.is_some() {
            return;
        }
        if self.attempt_count >= self.max_attempts {
            self.is_permanent_failure = true;
        } else if was_running || self.is_permanent_failure {
            self.is_permanent_failure = false;
            self.countdown.start(now);
        }
    }

    /// Applies the earliest due deadline, if any.
    pub(crate) fn step(&mut self, config: &RetryConfig, now: Instant) -> Option<SessionStep> {
        if let Some(settle) = self.settle {
            if now < settle.at {
                return None;
            }
            self.settle = None;
            self.finish_settle(settle, config);
            return Some(SessionStep::RetryDue);
        }

        match self.countdown.poll(now)? {
            CountdownTick::Remaining(_) => Some(SessionStep::Ticked),
            CountdownTick::Expired { at } => {
                self.settle = Some(Settle {
                    at: at + config.settle_delay,
                    kind: SettleKind::Attempt,
                });
                debug!(
                    session_id = self.id,
                    attempt = self.attempt_count,
                    "retry countdown expired"
                );
                Some(SessionStep::Ticked)
            }
        }
    }

    fn finish_settle(&mut self, settle: Settle, config: &RetryConfig) {
        if settle.kind == SettleKind::Attempt {
            self.attempt_count = self.attempt_count.saturating_add(1).min(self.max_attempts);
        }

        if self.attempt_count >= self.max_attempts {
            self.countdown.cancel();
            self.is_permanent_failure = true;
            debug!(
                session_id = self.id,
                attempt = self.attempt_count,
                max_attempts = self.max_attempts,
                "retry attempts exhausted"
            );
        } else {
            self.countdown = Countdown::new(config.retry_delay_seconds, config.tick_interval);
            self.countdown.start(settle.at);
            debug!(
                session_id = self.id,
                attempt = self.attempt_count,
                "retry fired, countdown restarted"
            );
        }
    }
}
