pub mod redis_cache;

use async_trait::async_trait;
use ghusers_common::error::GhUsersResult;
use ghusers_db::users::models::User;

pub use redis_cache::RedisUserCache;

/// Key-value cache of users keyed by login.
#[async_trait]
pub trait UserCache: Send + Sync {
    /// `Ok(None)` is a miss.
    async fn get_user(&self, login: &str) -> GhUsersResult<Option<User>>;
    /// Stores `user` under its own login with the cache's fixed TTL.
    async fn set_user(&self, user: &User) -> GhUsersResult<()>;
    async fn delete_user(&self, login: &str) -> GhUsersResult<()>;
}

pub fn cache_key(login: &str) -> String {
    format!("user:{login}")
}
