//! Retry/backoff state machine behind the dashboard's error panel.
//!
//! A [`RetryScheduler`] owns at most one [`RetrySession`]. Time only enters
//! through explicit `Instant` arguments, so the machine runs the same under
//! tokio's clock and under synthetic instants in tests.

mod config;
mod countdown;
mod scheduler;
mod session;
mod view;

pub use config::{RetryConfig, RetryConfigError};
pub use countdown::{Countdown, CountdownTick};
pub use scheduler::{RetryAction, RetryScheduler};
pub use session::{RetryPhase, RetrySession};
pub use view::{
    ActionButton, ErrorActionKind, ErrorView, IconState, PageReload, RetryStatusView,
    dispatch_error_action,
};
