//! Shell-level dashboard model: posts, loading, search and the error panel.

mod render;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::posts::{Debouncer, Post, PostsClientError, filter_posts};
use crate::retry::{
    ErrorActionKind, ErrorView, RetryConfig, RetryConfigError, RetryScheduler,
    dispatch_error_action,
};

pub use render::render_dashboard;

pub const DASHBOARD_TITLE: &str = "Posts Dashboard";
pub const DASHBOARD_SUBTITLE: &str = "Discover and explore amazing posts";

/// What a call to [`DashboardState::advance`] or an action produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardUpdate {
    pub changed: bool,
    /// The caller must start a fetch via [`DashboardState::begin_fetch`].
    pub fetch_requested: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardBody {
    /// Loading or error state covers the list.
    Hidden,
    Empty { message: String },
    Posts(Vec<Post>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub search_status: Option<String>,
    pub error: Option<ErrorView>,
    pub loading: bool,
    pub body: DashboardBody,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct DashboardState {
    posts: Vec<Post>,
    filtered: Vec<Post>,
    loading: bool,
    error: Option<String>,
    search_term: String,
    applied_term: String,
    debouncer: Debouncer<String>,
    retry: RetryScheduler,
    fetch_generation: u64,
    pending_fetch: Option<u64>,
    last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(retry_config: RetryConfig, debounce: Duration) -> Result<Self, RetryConfigError> {
        Ok(Self {
            posts: Vec::new(),
            filtered: Vec::new(),
            loading: true,
            error: None,
            search_term: String::new(),
            applied_term: String::new(),
            debouncer: Debouncer::new(debounce),
            retry: RetryScheduler::new(retry_config)?,
            fetch_generation: 0,
            pending_fetch: None,
            last_updated: None,
        })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn filtered_posts(&self) -> &[Post] {
        &self.filtered
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn applied_search_term(&self) -> &str {
        &self.applied_term
    }

    pub fn retry(&self) -> &RetryScheduler {
        &self.retry
    }

    /// Marks a fetch as in flight and returns its generation. Any earlier
    /// fetch is superseded and its result will be ignored.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.pending_fetch = Some(self.fetch_generation);
        self.loading = true;
        self.fetch_generation
    }

    pub fn fetch_in_flight(&self) -> Option<u64> {
        self.pending_fetch
    }

    /// Applies a fetch result. Returns false for superseded generations.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<Post>, PostsClientError>,
        now: Instant,
    ) -> bool {
        if self.pending_fetch != Some(generation) {
            return false;
        }
        self.pending_fetch = None;
        self.loading = false;

        match result {
            Ok(posts) => {
                info!(generation, count = posts.len(), "posts loaded");
                self.posts = posts;
                self.filtered = filter_posts(&self.posts, &self.applied_term);
                self.error = None;
                self.last_updated = Some(Utc::now());
                self.retry.clear_error();
            }
            Err(err) => {
                let message = err.to_string();
                warn!(generation, "posts fetch failed: {message}");
                self.retry.report_error(message.clone(), now);
                self.error = Some(message);
            }
        }
        true
    }

    pub fn set_search_term(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into();
        self.search_term = term.clone();
        self.debouncer.push(term, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.deadline(), self.retry.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every debounce and retry deadline due at `now`.
    pub fn advance(&mut self, now: Instant) -> DashboardUpdate {
        let mut update = DashboardUpdate::default();

        if let Some(term) = self.debouncer.poll(now) {
            self.applied_term = term;
            self.filtered = filter_posts(&self.posts, &self.applied_term);
            update.changed = true;
        }

        let mut retry_due = false;
        if self.retry.advance(now, &mut || retry_due = true) {
            update.changed = true;
        }
        update.fetch_requested = retry_due;
        update
    }

    /// Presses an error panel button.
    pub fn press(&mut self, action: ErrorActionKind, now: Instant) -> DashboardUpdate {
        let mut reload_requested = false;
        let changed = dispatch_error_action(
            action,
            &mut self.retry,
            &mut || reload_requested = true,
            now,
        );
        if reload_requested {
            self.reload();
            return DashboardUpdate {
                changed: true,
                fetch_requested: true,
            };
        }
        DashboardUpdate {
            changed,
            fetch_requested: false,
        }
    }

    /// The first enabled retry-type button on the error panel, if any.
    pub fn retry_button(&self) -> Option<ErrorActionKind> {
        let view = self.retry.session().map(ErrorView::from_session)?;
        [ErrorActionKind::RetryNow, ErrorActionKind::TryAgain]
            .into_iter()
            .find(|kind| view.is_enabled(*kind))
    }

    /// Back to a fresh page load. The caller starts the initial fetch.
    pub fn reload(&mut self) {
        info!("dashboard reloaded");
        self.retry.cancel();
        self.debouncer.cancel();
        self.posts.clear();
        self.filtered.clear();
        self.loading = true;
        self.error = None;
        self.search_term.clear();
        self.applied_term.clear();
        self.pending_fetch = None;
        self.last_updated = None;
    }

    /// Drops every pending timer.
    pub fn shutdown(&mut self) {
        self.retry.cancel();
        self.debouncer.cancel();
        self.pending_fetch = None;
    }

    pub fn view(&self) -> DashboardView {
        let search_status = if self.search_term.is_empty() {
            None
        } else {
            Some(format!("Searching for post ID: {}", self.search_term))
        };

        let error = match &self.error {
            Some(_) => self.retry.session().map(ErrorView::from_session),
            None => None,
        };

        let body = if self.loading || self.error.is_some() {
            DashboardBody::Hidden
        } else if self.filtered.is_empty() {
            DashboardBody::Empty {
                message: empty_message(&self.search_term),
            }
        } else {
            DashboardBody::Posts(self.filtered.clone())
        };

        DashboardView {
            search_status,
            error,
            loading: self.loading,
            body,
            last_updated: self.last_updated,
        }
    }
}

fn empty_message(search_term: &str) -> String {
    if search_term.is_empty() {
        "There are no posts available at the moment. Please try again later.".to_string()
    } else {
        format!(
            "No post found with ID \"{search_term}\". Try searching for a different post ID."
        )
    }
}
