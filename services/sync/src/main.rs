mod pipeline;

use std::sync::Arc;

use ghusers_config::{init_tracing, AppConfig, GitHubConfig, SyncConfig};
use ghusers_db::users::pg_repository::PgUserRepository;
use ghusers_github::GitHubClient;
use tokio_util::sync::CancellationToken;

use crate::pipeline::SyncRunner;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let github_config = GitHubConfig::from_env().expect("failed to load GitHub config");
    let sync_config = SyncConfig::from_env().expect("failed to load sync config");
    tracing::info!(service = "ghusers-sync", "starting");

    let pool = ghusers_db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    ghusers_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping sync");
            on_signal.cancel();
        }
    });

    let client = GitHubClient::new(github_config, cancel.clone())
        .expect("failed to create GitHub client");
    let repo = PgUserRepository::new(pool);

    let runner = SyncRunner::new(Arc::new(client), Arc::new(repo), sync_config, cancel)
        .expect("invalid sync config");
    let summary = runner.run().await;

    tracing::info!(
        pages = summary.pages,
        dispatched = summary.dispatched,
        upserted = summary.upserted,
        failed = summary.failed,
        "sync service finished"
    );
    std::process::exit(summary.exit_code());
}
