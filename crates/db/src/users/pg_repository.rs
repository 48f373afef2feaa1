use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};

use crate::users::models::{ListQuery, User};
use crate::users::repositories::{UserRepository, UserSink};
use ghusers_common::error::{GhUsersError, GhUsersResult};

const USER_COLUMNS: &str = "id, login, node_id, avatar_url, url, html_url, \"type\", \
                            user_view_type, site_admin, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: PgRow) -> GhUsersResult<User> {
        Ok(User {
            id: row.get("id"),
            login: row.get("login"),
            node_id: row.get("node_id"),
            avatar_url: row.get("avatar_url"),
            url: row.get("url"),
            html_url: row.get("html_url"),
            user_type: row.get("type"),
            user_view_type: row.get("user_view_type"),
            site_admin: row.get("site_admin"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserSink for PgUserRepository {
    async fn upsert(&self, user: &User) -> GhUsersResult<()> {
        sqlx::query(
            "insert into github_users
               (id, login, node_id, avatar_url, url, html_url, \"type\", user_view_type, site_admin)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             on conflict (id) do update set
               login = excluded.login,
               node_id = excluded.node_id,
               avatar_url = excluded.avatar_url,
               url = excluded.url,
               html_url = excluded.html_url,
               \"type\" = excluded.\"type\",
               user_view_type = excluded.user_view_type,
               site_admin = excluded.site_admin,
               updated_at = now()",
        )
        .bind(user.id)
        .bind(&user.login)
        .bind(&user.node_id)
        .bind(&user.avatar_url)
        .bind(&user.url)
        .bind(&user.html_url)
        .bind(&user.user_type)
        .bind(&user.user_view_type)
        .bind(user.site_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("github_users_login_uidx") {
                GhUsersError::Conflict(format!("login already taken: {}", user.login))
            } else {
                GhUsersError::Database(msg)
            }
        })?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_login(&self, login: &str) -> GhUsersResult<Option<User>> {
        let row = sqlx::query(&format!(
            "select {USER_COLUMNS} from github_users where login = $1 limit 1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GhUsersError::Database(e.to_string()))?;

        row.map(Self::map_row).transpose()
    }

    async fn list(&self, query: &ListQuery) -> GhUsersResult<Vec<User>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("select {USER_COLUMNS} from github_users"));

        // Column and direction come from closed enums, never from raw input.
        qb.push(" order by ")
            .push(query.order_by.as_sql())
            .push(" ")
            .push(query.direction.as_sql());
        qb.push(" limit ").push_bind(query.limit);
        qb.push(" offset ").push_bind(query.offset());

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GhUsersError::Database(e.to_string()))?;

        rows.into_iter().map(Self::map_row).collect()
    }

    async fn delete_by_login(&self, login: &str) -> GhUsersResult<()> {
        let result = sqlx::query("delete from github_users where login = $1")
            .bind(login)
            .execute(&self.pool)
            .await
            .map_err(|e| GhUsersError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(GhUsersError::NotFound(format!("user not found: {login}")));
        }
        Ok(())
    }
}
