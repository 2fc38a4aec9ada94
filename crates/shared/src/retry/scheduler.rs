use std::time::Instant;

use tracing::debug;

use super::session::{RetryPhase, RetrySession, SessionStep};
use super::{RetryConfig, RetryConfigError};

/// The zero-argument action the scheduler fires when a retry is due.
pub trait RetryAction {
    fn retry(&mut self);
}

impl<F> RetryAction for F
where
    F: FnMut(),
{
    fn retry(&mut self) {
        self()
    }
}

/// Drives automatic and manual retries for one error panel.
///
/// The scheduler performs no I/O and never fails. It reacts to the error
/// being reported or cleared, to time passing via [`RetryScheduler::advance`],
/// and to manual retry requests.
#[derive(Debug)]
pub struct RetryScheduler {
    config: RetryConfig,
    session: Option<RetrySession>,
    next_session_id: u64,
}

impl RetryScheduler {
    pub fn new(config: RetryConfig) -> Result<Self, RetryConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            next_session_id: 1,
        })
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&RetrySession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> RetryPhase {
        self.session
            .as_ref()
            .map_or(RetryPhase::Idle, RetrySession::phase)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().and_then(RetrySession::next_deadline)
    }

    /// Reports a failed fetch. Opens a session when idle; otherwise only the
    /// message changes and the running cycle continues.
    pub fn report_error(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match self.session.as_mut() {
            Some(session) => session.record_error(message),
            None => {
                let id = self.next_session_id;
                self.next_session_id += 1;
                debug!(session_id = id, "retry session opened");
                self.session = Some(RetrySession::start(id, message, &self.config, now));
            }
        }
    }

    /// The error went away: the session and all of its timers are dropped.
    pub fn clear_error(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(
                session_id = session.id(),
                attempt = session.attempt_count(),
                "retry session resolved"
            );
        }
    }

    /// Tears the session down without it having resolved.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session_id = session.id(), "retry session cancelled");
        }
    }

    /// Manual retry entry point. Skips the countdown while counting down and
    /// restarts the whole session after permanent failure. Returns whether
    /// the request was accepted.
    pub fn request_manual_retry(&mut self, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.phase() {
            RetryPhase::CountingDown => session.retry_now(&self.config, now),
            RetryPhase::PermanentFailure => session.restart(&self.config, now),
            RetryPhase::Retrying | RetryPhase::Idle => false,
        }
    }

    /// Swaps the settings. A live countdown restarts from the new delay.
    pub fn reconfigure(
        &mut self,
        config: RetryConfig,
        now: Instant,
    ) -> Result<(), RetryConfigError> {
        config.validate()?;
        self.config = config;
        if let Some(session) = self.session.as_mut() {
            session.reconfigure(&self.config, now);
        }
        Ok(())
    }

    /// Applies every deadline that is due at `now`, in order, firing `action`
    /// once per retry. Returns whether the session changed.
    pub fn advance<A>(&mut self, now: Instant, action: &mut A) -> bool
    where
        A: RetryAction + ?Sized,
    {
        let mut changed = false;
        while let Some(session) = self.session.as_mut() {
            match session.step(&self.config, now) {
                Some(SessionStep::Ticked) => changed = true,
                Some(SessionStep::RetryDue) => {
                    changed = true;
                    action.retry();
                }
                None => break,
            }
        }
        changed
    }
}
