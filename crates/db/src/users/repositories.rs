use async_trait::async_trait;

use crate::users::models::{ListQuery, User};
use ghusers_common::error::GhUsersResult;

/// Write-only persistence target used by the sync workers.
#[async_trait]
pub trait UserSink: Send + Sync {
    /// Insert or update a user keyed by `id`.
    /// On conflict every descriptive field is overwritten and `updated_at` is bumped;
    /// `created_at` is preserved.
    async fn upsert(&self, user: &User) -> GhUsersResult<()>;
}

#[async_trait]
pub trait UserRepository: UserSink {
    async fn get_by_login(&self, login: &str) -> GhUsersResult<Option<User>>;
    async fn list(&self, query: &ListQuery) -> GhUsersResult<Vec<User>>;

    /// Returns `NotFound` when no row carries `login`.
    async fn delete_by_login(&self, login: &str) -> GhUsersResult<()>;
}
