use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ghusers_common::error::GhUsersError;
use ghusers_config::GitHubConfig;
use reqwest::{header, Client, Response, StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::models::GitHubUser;
use crate::rate_limit::RateLimiter;
use crate::source::UserSource;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "ghusers-mirror";

#[derive(Debug, thiserror::Error)]
pub enum GitHubClientError {
    #[error("user {0} not found")]
    NotFound(String),

    /// 429 or any 5xx.
    #[error("GitHub rate/server error {status}: {body}")]
    Throttled { status: StatusCode, body: String },

    #[error("unexpected GitHub status {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid GitHub base URL: {0}")]
    InvalidUrl(String),

    #[error("request cancelled")]
    Cancelled,
}

impl From<GitHubClientError> for GhUsersError {
    fn from(err: GitHubClientError) -> Self {
        match err {
            GitHubClientError::NotFound(login) => {
                GhUsersError::NotFound(format!("user {login} not found"))
            }
            GitHubClientError::Throttled { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
                GhUsersError::RateLimited(err.to_string())
            }
            GitHubClientError::HttpError { status, .. } if status == StatusCode::UNAUTHORIZED => {
                GhUsersError::Unauthorized(err.to_string())
            }
            GitHubClientError::HttpError { status, .. } if status == StatusCode::FORBIDDEN => {
                GhUsersError::Forbidden(err.to_string())
            }
            GitHubClientError::InvalidUrl(_) => GhUsersError::Config(err.to_string()),
            GitHubClientError::Cancelled => GhUsersError::Internal(err.to_string()),
            other => GhUsersError::Upstream(other.to_string()),
        }
    }
}

/// HTTP adapter for the GitHub users API.
///
/// Every request first waits on the shared [`RateLimiter`]; both the wait and
/// the request itself abort with [`GitHubClientError::Cancelled`] once the
/// client's cancellation token fires.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig, cancel: CancellationToken) -> Result<Self, GitHubClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        let limiter = Arc::new(RateLimiter::new(config.rate_per_sec, config.rate_burst));
        Ok(Self {
            client,
            config,
            limiter,
            cancel,
        })
    }

    /// For testing: create a client pointing at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, url: &str) -> Result<Response, GitHubClientError> {
        self.limiter.acquire(&self.cancel).await?;

        let mut request = self.client.get(url).header(header::ACCEPT, ACCEPT_V3);
        if let Some(token) = &self.config.token {
            request = request.header(header::AUTHORIZATION, format!("token {token}"));
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(GitHubClientError::Cancelled),
            response = request.send() => Ok(response?),
        }
    }

    /// `{base}/users/{login}` with `login` encoded as a single path segment.
    fn user_url(&self, login: &str) -> Result<Url, GitHubClientError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GitHubClientError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GitHubClientError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["users", login]);
        Ok(url)
    }

    /// Classify a non-200 response. 404 handling is left to the caller.
    async fn status_error(response: Response) -> GitHubClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            GitHubClientError::Throttled { status, body }
        } else {
            GitHubClientError::HttpError { status, body }
        }
    }
}

#[async_trait]
impl UserSource for GitHubClient {
    async fn fetch_users_since(
        &self,
        since: i64,
        per_page: u32,
    ) -> Result<Vec<GitHubUser>, GitHubClientError> {
        let url = format!(
            "{}/users?per_page={}&since={}",
            self.config.base_url, per_page, since
        );
        let response = self.get(&url).await?;

        if response.status() != StatusCode::OK {
            return Err(Self::status_error(response).await);
        }

        let users = response.json::<Vec<GitHubUser>>().await?;
        tracing::debug!(since, count = users.len(), "fetched github users page");
        Ok(users)
    }

    async fn fetch_user(&self, login: &str) -> Result<GitHubUser, GitHubClientError> {
        let url = self.user_url(login)?;
        let response = self.get(url.as_str()).await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<GitHubUser>().await?),
            StatusCode::NOT_FOUND => Err(GitHubClientError::NotFound(login.to_string())),
            _ => Err(Self::status_error(response).await),
        }
    }
}
