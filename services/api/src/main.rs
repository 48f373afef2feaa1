mod error;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use ghusers_cache::{RedisUserCache, UserCache};
use ghusers_common::types::ServiceInfo;
use ghusers_config::{init_tracing, AppConfig, GitHubConfig};
use ghusers_db::users::pg_repository::PgUserRepository;
use ghusers_github::GitHubClient;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::users::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("ghusers-api"))
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .merge(users::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let github_config = GitHubConfig::from_env().expect("failed to load GitHub config");
    tracing::info!(service = "ghusers-api", "starting");

    let pool = ghusers_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");
    ghusers_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let cache: Option<Arc<dyn UserCache>> =
        match RedisUserCache::connect(&config.redis_url, config.cache_ttl_secs).await {
            Ok(cache) => Some(Arc::new(cache) as Arc<dyn UserCache>),
            Err(e) => {
                tracing::warn!(error = %e, "redis unavailable, serving without cache");
                None
            }
        };

    let shutdown = CancellationToken::new();
    let client = GitHubClient::new(github_config, shutdown.clone())
        .expect("failed to create GitHub client");

    let state = AppState {
        users: Arc::new(UserService::new(
            Arc::new(PgUserRepository::new(pool)),
            cache,
            Arc::new(client),
        )),
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
            shutdown.cancel();
        })
        .await
        .expect("server error");
}
