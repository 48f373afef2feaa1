pub mod users;

use ghusers_common::error::{GhUsersError, GhUsersResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const SCHEMA: &str = include_str!("../migrations/0001_create_github_users.sql");

/// Create a Postgres connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> GhUsersResult<PgPool> {
    tracing::info!("connecting to database");
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| GhUsersError::Database(e.to_string()))
}

/// Apply the `github_users` schema. Safe to run on every start.
pub async fn run_migrations(pool: &PgPool) -> GhUsersResult<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| GhUsersError::Database(e.to_string()))?;
    tracing::info!("database schema ready");
    Ok(())
}
