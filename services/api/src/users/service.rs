use std::sync::Arc;

use ghusers_cache::UserCache;
use ghusers_common::error::{GhUsersError, GhUsersResult};
use ghusers_db::users::models::{ListOptions, User};
use ghusers_db::users::repositories::UserRepository;
use ghusers_github::UserSource;

use crate::users::requests::UpdateUserRequest;

/// Read/write operations over mirrored users.
///
/// Reads of a single user are served from the cache when possible and
/// otherwise fetched live from upstream. Writes go to the repository and
/// then refresh the cache. The cache is optional and never fails a request.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Option<Arc<dyn UserCache>>,
    source: Arc<dyn UserSource>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        cache: Option<Arc<dyn UserCache>>,
        source: Arc<dyn UserSource>,
    ) -> Self {
        Self {
            repo,
            cache,
            source,
        }
    }

    pub async fn list(&self, options: &ListOptions) -> GhUsersResult<Vec<User>> {
        let query = options.normalize();
        self.repo.list(&query).await
    }

    pub async fn get(&self, login: &str) -> GhUsersResult<User> {
        if let Some(user) = self.cached(login).await {
            return Ok(user);
        }

        let user = User::from(self.source.fetch_user(login).await?);
        self.store_in_cache(&user).await;
        Ok(user)
    }

    pub async fn update(&self, login: &str, patch: &UpdateUserRequest) -> GhUsersResult<User> {
        let mut user = self
            .repo
            .get_by_login(login)
            .await?
            .ok_or_else(|| GhUsersError::NotFound(format!("user {login} not found")))?;

        patch.apply(&mut user);
        self.repo.upsert(&user).await?;

        // Pick up store-owned timestamps.
        let user = match self.repo.get_by_login(&user.login).await? {
            Some(stored) => stored,
            None => user,
        };

        if user.login != login {
            self.evict(login).await;
        }
        self.store_in_cache(&user).await;

        tracing::info!(login = %user.login, id = user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, login: &str) -> GhUsersResult<()> {
        self.repo.delete_by_login(login).await?;
        self.evict(login).await;
        tracing::info!(%login, "user deleted");
        Ok(())
    }

    async fn cached(&self, login: &str) -> Option<User> {
        let cache = self.cache.as_ref()?;
        match cache.get_user(login).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(%login, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store_in_cache(&self, user: &User) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_user(user).await {
                tracing::warn!(login = %user.login, error = %e, "cache write failed");
            }
        }
    }

    async fn evict(&self, login: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete_user(login).await {
                tracing::warn!(%login, error = %e, "cache delete failed");
            }
        }
    }
}
