use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Post, normalize_posts};

pub type PostsFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Post>, PostsClientError>> + Send + 'a>>;

/// Fetch-and-normalize collaborator behind the dashboard.
pub trait PostsSource: Send + Sync {
    fn fetch_posts<'a>(&'a self) -> PostsFuture<'a>;
}

/// Display strings are what the error panel shows.
#[derive(Debug, Error)]
pub enum PostsClientError {
    #[error("Failed To Fetch Posts")]
    Status { status: u16 },
    #[error("Request timed out")]
    Timeout,
    #[error("Network request failed: {0}")]
    Request(String),
    #[error("Received an invalid posts payload: {0}")]
    InvalidPayload(String),
    #[error("failed to build posts http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct HttpPostsClient {
    client: reqwest::Client,
    url: String,
}

impl HttpPostsClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PostsClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PostsClientError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Vec<Post>, PostsClientError> {
        let response = self.client.get(&self.url).send().await.map_err(|err| {
            if err.is_timeout() {
                PostsClientError::Timeout
            } else {
                PostsClientError::Request(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "posts request rejected");
            return Err(PostsClientError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                PostsClientError::Timeout
            } else {
                PostsClientError::Request(err.to_string())
            }
        })?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|err| PostsClientError::InvalidPayload(err.to_string()))?;
        let posts = normalize_posts(payload)
            .map_err(|err| PostsClientError::InvalidPayload(err.to_string()))?;

        debug!(url = %self.url, count = posts.len(), "posts fetched");
        Ok(posts)
    }
}

impl PostsSource for HttpPostsClient {
    fn fetch_posts<'a>(&'a self) -> PostsFuture<'a> {
        Box::pin(self.fetch_once())
    }
}
