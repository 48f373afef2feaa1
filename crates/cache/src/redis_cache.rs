use async_trait::async_trait;
use ghusers_common::error::{GhUsersError, GhUsersResult};
use ghusers_db::users::models::User;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::{cache_key, UserCache};

#[derive(Clone)]
pub struct RedisUserCache {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisUserCache {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> GhUsersResult<Self> {
        let client = Client::open(redis_url).map_err(|e| GhUsersError::Cache(e.to_string()))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| GhUsersError::Cache(e.to_string()))?;
        tracing::info!(ttl_secs, "redis cache connected");
        Ok(Self {
            connection,
            ttl_secs,
        })
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get_user(&self, login: &str) -> GhUsersResult<Option<User>> {
        let key = cache_key(login);
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| GhUsersError::Cache(e.to_string()))?;

        match raw {
            None => {
                tracing::debug!(%key, "cache miss");
                Ok(None)
            }
            Some(value) => {
                let user = serde_json::from_str(&value).map_err(|e| {
                    GhUsersError::Cache(format!("corrupt cache entry {key}: {e}"))
                })?;
                tracing::debug!(%key, "cache hit");
                Ok(Some(user))
            }
        }
    }

    async fn set_user(&self, user: &User) -> GhUsersResult<()> {
        let key = cache_key(&user.login);
        let value =
            serde_json::to_string(user).map_err(|e| GhUsersError::Internal(e.to_string()))?;
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(&key, value, self.ttl_secs)
            .await
            .map_err(|e| GhUsersError::Cache(e.to_string()))?;
        tracing::debug!(%key, "user cached");
        Ok(())
    }

    async fn delete_user(&self, login: &str) -> GhUsersResult<()> {
        let key = cache_key(login);
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| GhUsersError::Cache(e.to_string()))?;
        tracing::debug!(%key, "cache entry deleted");
        Ok(())
    }
}
