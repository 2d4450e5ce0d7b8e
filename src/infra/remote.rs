//! reqwest-backed client for the backend's `/posts` collection.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use postboard_api_types::{Post, PostCreateRequest, PostId};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::remote::{PostsApi, RemoteError};

use super::{
    error::InfraError,
    telemetry::{METRIC_REMOTE_REQUEST_MS, METRIC_REMOTE_REQUESTS},
};

const POSTS_PATH: &str = "posts";

#[derive(Clone, Debug)]
pub struct HttpPostsApi {
    client: Client,
    base: Url,
}

impl HttpPostsApi {
    pub fn new(base: Url) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self {
            client,
            base: with_trailing_slash(base),
        }
    }

    pub fn user_agent() -> &'static str {
        concat!("postboard/", env!("CARGO_PKG_VERSION"))
    }

    fn collection_url(&self) -> Result<Url, RemoteError> {
        self.base
            .join(POSTS_PATH)
            .map_err(|err| RemoteError::Url(err.to_string()))
    }

    fn item_url(&self, id: &PostId) -> Result<Url, RemoteError> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|()| RemoteError::Url(format!("`{}` cannot be a base", self.base)))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, RemoteError> {
        let started = Instant::now();
        let result = read_success(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        counter!(METRIC_REMOTE_REQUESTS, "operation" => operation, "outcome" => outcome)
            .increment(1);
        histogram!(METRIC_REMOTE_REQUEST_MS, "operation" => operation).record(elapsed_ms);

        debug!(
            target = "postboard::remote",
            operation,
            outcome,
            elapsed_ms,
            "backend request finished"
        );
        result
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let bytes = self.execute(operation, request).await?;
        serde_json::from_slice(&bytes).map_err(RemoteError::decode)
    }
}

async fn read_success(request: RequestBuilder) -> Result<Vec<u8>, RemoteError> {
    let resp = request.send().await.map_err(RemoteError::transport)?;
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(RemoteError::transport)?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(bytes.to_vec())
}

/// `Url::join` drops the last path segment unless it ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self) -> Result<Vec<Post>, RemoteError> {
        let url = self.collection_url()?;
        self.execute_json("list", self.client.get(url)).await
    }

    async fn create_post(&self, request: &PostCreateRequest) -> Result<Post, RemoteError> {
        let url = self.collection_url()?;
        self.execute_json("create", self.client.post(url).json(request))
            .await
    }

    async fn update_post(&self, post: &Post) -> Result<Post, RemoteError> {
        let url = self.item_url(&post.id)?;
        self.execute_json("update", self.client.put(url).json(post))
            .await
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), RemoteError> {
        let url = self.item_url(id)?;
        self.execute("delete", self.client.delete(url)).await?;
        Ok(())
    }
}
