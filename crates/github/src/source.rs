use async_trait::async_trait;

use crate::client::GitHubClientError;
use crate::models::GitHubUser;

/// Read access to the upstream user directory.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// One page of users with `id > since`, in ascending id order as returned upstream.
    async fn fetch_users_since(
        &self,
        since: i64,
        per_page: u32,
    ) -> Result<Vec<GitHubUser>, GitHubClientError>;

    /// A single user by login. A 404 surfaces as [`GitHubClientError::NotFound`].
    async fn fetch_user(&self, login: &str) -> Result<GitHubUser, GitHubClientError>;
}
