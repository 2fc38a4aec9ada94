use std::time::Instant;

use super::scheduler::RetryScheduler;
use super::session::{RetryPhase, RetrySession};

const TRANSIENT_TITLE: &str = "Temporary Issue";
const PERMANENT_TITLE: &str = "Connection Failed";
const FALLBACK_DESCRIPTION: &str = "Oops something went wrong";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Normal,
    Retrying,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorActionKind {
    RetryNow,
    TryAgain,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub kind: ErrorActionKind,
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryStatusView {
    Retrying,
    Countdown {
        seconds: u32,
        /// Share of the ring drawn, in `(0, 1]`.
        fill_fraction: f64,
    },
}

impl RetryStatusView {
    pub fn label(&self) -> String {
        match self {
            Self::Retrying => "Retrying...".to_string(),
            Self::Countdown { seconds, .. } => format!("Auto-retry in {seconds} seconds"),
        }
    }
}

/// Display model for the error panel. Pure state-to-view mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub icon: IconState,
    pub title: &'static str,
    pub description: String,
    pub retry_status: Option<RetryStatusView>,
    pub attempt_label: Option<String>,
    pub actions: Vec<ActionButton>,
}

impl ErrorView {
    pub fn from_session(session: &RetrySession) -> Self {
        let retrying = session.is_retrying();
        let permanent = session.phase() == RetryPhase::PermanentFailure;

        let description = session
            .last_error_message()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_DESCRIPTION)
            .to_string();

        if permanent {
            return Self {
                icon: IconState::Critical,
                title: PERMANENT_TITLE,
                description,
                retry_status: None,
                attempt_label: None,
                actions: vec![
                    ActionButton {
                        kind: ErrorActionKind::TryAgain,
                        label: if retrying { "Retrying..." } else { "Try Again" },
                        enabled: !retrying,
                    },
                    ActionButton {
                        kind: ErrorActionKind::Reload,
                        label: "Reload Page",
                        enabled: true,
                    },
                ],
            };
        }

        let retry_status = if retrying {
            RetryStatusView::Retrying
        } else {
            RetryStatusView::Countdown {
                seconds: session.countdown(),
                fill_fraction: fill_fraction(session.retry_delay_seconds(), session.countdown()),
            }
        };

        Self {
            icon: if retrying {
                IconState::Retrying
            } else {
                IconState::Normal
            },
            title: TRANSIENT_TITLE,
            description,
            retry_status: Some(retry_status),
            attempt_label: Some(format!(
                "Attempt {} of {}",
                session.display_attempt(),
                session.max_attempts()
            )),
            actions: vec![ActionButton {
                kind: ErrorActionKind::RetryNow,
                label: "Retry Now",
                enabled: !retrying,
            }],
        }
    }

    pub fn is_enabled(&self, kind: ErrorActionKind) -> bool {
        self.actions
            .iter()
            .any(|action| action.kind == kind && action.enabled)
    }
}

fn fill_fraction(delay_seconds: u32, countdown: u32) -> f64 {
    if delay_seconds == 0 {
        return 1.0;
    }
    let elapsed = delay_seconds.saturating_sub(countdown).saturating_add(1);
    (f64::from(elapsed) / f64::from(delay_seconds)).min(1.0)
}

/// Full reset of the surrounding page.
pub trait PageReload {
    fn reload(&mut self);
}

impl<F> PageReload for F
where
    F: FnMut(),
{
    fn reload(&mut self) {
        self()
    }
}

/// Routes a button press. Presses on hidden or disabled buttons are ignored.
/// Returns whether anything happened.
pub fn dispatch_error_action<R>(
    kind: ErrorActionKind,
    scheduler: &mut RetryScheduler,
    reloader: &mut R,
    now: Instant,
) -> bool
where
    R: PageReload + ?Sized,
{
    let Some(view) = scheduler.session().map(ErrorView::from_session) else {
        return false;
    };
    if !view.is_enabled(kind) {
        return false;
    }

    match kind {
        ErrorActionKind::RetryNow | ErrorActionKind::TryAgain => {
            scheduler.request_manual_retry(now)
        }
        ErrorActionKind::Reload => {
            reloader.reload();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::retry::RetryConfig;

    const SECOND: Duration = Duration::from_secs(1);
    const SETTLE: Duration = Duration::from_millis(800);

    fn scheduler(max_attempts: u32, delay: u32) -> RetryScheduler {
        RetryScheduler::new(RetryConfig::new(max_attempts, delay)).expect("config should be valid")
    }

    fn exhaust(scheduler: &mut RetryScheduler, start: Instant) -> Instant {
        let mut now = start;
        while scheduler.phase() != RetryPhase::PermanentFailure {
            now += Duration::from_millis(100);
            scheduler.advance(now, &mut || {});
        }
        now
    }

    #[test]
    fn counting_down_view_shows_countdown_and_attempt() {
        let start = Instant::now();
        let mut scheduler = scheduler(3, 3);
        scheduler.report_error("Failed To Fetch Posts", start);

        let view = ErrorView::from_session(scheduler.session().expect("session should exist"));
        assert_eq!(view.icon, IconState::Normal);
        assert_eq!(view.title, "Temporary Issue");
        assert_eq!(view.description, "Failed To Fetch Posts");
        assert_eq!(view.attempt_label.as_deref(), Some("Attempt 1 of 3"));
        match view.retry_status {
            Some(RetryStatusView::Countdown {
                seconds,
                fill_fraction,
            }) => {
                assert_eq!(seconds, 3);
                assert!((fill_fraction - 1.0 / 3.0).abs() < f64::EPSILON);
            }
            other => panic!("expected countdown status, got {other:?}"),
        }
        assert_eq!(
            view.actions,
            vec![ActionButton {
                kind: ErrorActionKind::RetryNow,
                label: "Retry Now",
                enabled: true,
            }]
        );

        scheduler.advance(start + SECOND * 2, &mut || {});
        let view = ErrorView::from_session(scheduler.session().expect("session should exist"));
        assert_eq!(
            view.retry_status.as_ref().map(RetryStatusView::label).as_deref(),
            Some("Auto-retry in 1 seconds")
        );
        match view.retry_status {
            Some(RetryStatusView::Countdown { fill_fraction, .. }) => {
                assert!((fill_fraction - 1.0).abs() < f64::EPSILON)
            }
            other => panic!("expected countdown status, got {other:?}"),
        }
    }

    #[test]
    fn retrying_view_disables_retry_now() {
        let start = Instant::now();
        let mut scheduler = scheduler(3, 3);
        scheduler.report_error("boom", start);
        scheduler.advance(start + SECOND * 3, &mut || {});

        let view = ErrorView::from_session(scheduler.session().expect("session should exist"));
        assert_eq!(view.icon, IconState::Retrying);
        assert_eq!(view.retry_status, Some(RetryStatusView::Retrying));
        assert!(!view.is_enabled(ErrorActionKind::RetryNow));
    }

    #[test]
    fn permanent_view_offers_try_again_and_reload() {
        let start = Instant::now();
        let mut scheduler = scheduler(1, 1);
        scheduler.report_error("   ", start);
        exhaust(&mut scheduler, start);

        let view = ErrorView::from_session(scheduler.session().expect("session should exist"));
        assert_eq!(view.icon, IconState::Critical);
        assert_eq!(view.title, "Connection Failed");
        assert_eq!(view.description, "Oops something went wrong");
        assert_eq!(view.retry_status, None);
        assert_eq!(view.attempt_label, None);
        assert!(view.is_enabled(ErrorActionKind::TryAgain));
        assert!(view.is_enabled(ErrorActionKind::Reload));
        assert!(!view.is_enabled(ErrorActionKind::RetryNow));
    }

    #[test]
    fn attempt_label_is_capped() {
        let start = Instant::now();
        let mut scheduler = scheduler(2, 1);
        scheduler.report_error("boom", start);
        scheduler.advance(start + SECOND + SETTLE, &mut || {});

        let session = scheduler.session().expect("session should exist");
        assert_eq!(session.attempt_count(), 1);
        assert_eq!(session.display_attempt(), 2);
        let view = ErrorView::from_session(session);
        assert_eq!(view.attempt_label.as_deref(), Some("Attempt 2 of 2"));
    }

    #[test]
    fn reload_button_only_works_when_visible() {
        let start = Instant::now();
        let mut scheduler = scheduler(1, 1);
        let mut reloads = 0;
        scheduler.report_error("boom", start);

        assert!(!dispatch_error_action(
            ErrorActionKind::Reload,
            &mut scheduler,
            &mut || reloads += 1,
            start,
        ));

        let now = exhaust(&mut scheduler, start);
        assert!(dispatch_error_action(
            ErrorActionKind::Reload,
            &mut scheduler,
            &mut || reloads += 1,
            now,
        ));
        assert_eq!(reloads, 1);
    }

    #[test]
    fn try_again_delegates_to_manual_retry() {
        let start = Instant::now();
        let mut scheduler = scheduler(1, 1);
        scheduler.report_error("boom", start);
        let now = exhaust(&mut scheduler, start);

        assert!(dispatch_error_action(
            ErrorActionKind::TryAgain,
            &mut scheduler,
            &mut || {},
            now,
        ));
        assert_eq!(scheduler.phase(), RetryPhase::Retrying);
        assert!(!dispatch_error_action(
            ErrorActionKind::RetryNow,
            &mut scheduler,
            &mut || {},
            now,
        ));
    }

    #[test]
    fn no_session_means_no_actions() {
        let mut scheduler = scheduler(3, 3);
        assert!(!dispatch_error_action(
            ErrorActionKind::RetryNow,
            &mut scheduler,
            &mut || {},
            Instant::now(),
        ));
    }
}
