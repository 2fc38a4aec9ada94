use std::time::{Duration, Instant};

use super::Post;

/// Exact match of the trimmed term against the decimal post id. An empty term
/// keeps every post.
pub fn filter_posts(posts: &[Post], term: &str) -> Vec<Post> {
    let term = term.trim();
    if term.is_empty() {
        return posts.to_vec();
    }
    posts
        .iter()
        .filter(|post| post.id.to_string() == term)
        .cloned()
        .collect()
}

/// Holds the latest value until it has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, due)) if now >= due => Some(value),
            still_pending => {
                self.pending = still_pending;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
