//! Seam between the board and the posts backend.

use async_trait::async_trait;
use postboard_api_types::{Post, PostCreateRequest, PostId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid backend URL: {0}")]
    Url(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// The four collection operations the board issues against `/posts`.
///
/// Implementations perform exactly one request per call: no retries, no timeouts.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>, RemoteError>;

    async fn create_post(&self, request: &PostCreateRequest) -> Result<Post, RemoteError>;

    async fn update_post(&self, post: &Post) -> Result<Post, RemoteError>;

    async fn delete_post(&self, id: &PostId) -> Result<(), RemoteError>;
}
