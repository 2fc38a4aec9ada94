//! Post records, the HTTP source they come from, and search over them.

mod client;
mod models;
mod search;

pub use client::{HttpPostsClient, PostsClientError, PostsFuture, PostsSource};
pub use models::{Post, Reactions, normalize_posts};
pub use search::{Debouncer, filter_posts};
