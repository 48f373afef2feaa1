use std::sync::Arc;

use ghusers_common::error::GhUsersResult;
use ghusers_config::SyncConfig;
use ghusers_db::users::repositories::UserSink;
use ghusers_github::UserSource;
use tokio_util::sync::CancellationToken;

use super::paginator::{Paginator, ProducerOutcome};
use super::workers::WorkerPool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub outcome: ProducerOutcome,
    pub pages: u64,
    pub dispatched: u64,
    pub upserted: u64,
    pub failed: u64,
}

impl SyncSummary {
    /// Process exit status for the `ghusers-sync` binary.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            ProducerOutcome::Exhausted => 0,
            ProducerOutcome::Cancelled { .. } => 130,
            ProducerOutcome::RetriesExhausted { .. } | ProducerOutcome::ChannelClosed { .. } => 1,
        }
    }
}

/// One full mirror pass: paginator feeding a worker pool through a bounded channel.
pub struct SyncRunner<S: ?Sized, K: ?Sized> {
    source: Arc<S>,
    sink: Arc<K>,
    config: SyncConfig,
    cancel: CancellationToken,
}

impl<S, K> SyncRunner<S, K>
where
    S: UserSource + ?Sized,
    K: UserSink + ?Sized + 'static,
{
    pub fn new(
        source: Arc<S>,
        sink: Arc<K>,
        config: SyncConfig,
        cancel: CancellationToken,
    ) -> GhUsersResult<Self> {
        config.validate()?;
        Ok(Self {
            source,
            sink,
            config,
            cancel,
        })
    }

    pub async fn run(&self) -> SyncSummary {
        let capacity = self.config.channel_capacity();
        let (tx, rx) = async_channel::bounded(capacity);

        tracing::info!(
            workers = self.config.worker_count,
            page_size = self.config.page_size,
            capacity,
            since = self.config.start_since,
            "sync started"
        );

        // Workers first so the first page never blocks on an unconsumed channel.
        let pool = WorkerPool::spawn(
            self.config.worker_count,
            rx,
            Arc::clone(&self.sink),
            self.config.upsert_delay,
        );

        let producer = Paginator::new(Arc::clone(&self.source), &self.config, self.cancel.clone())
            .run(tx)
            .await;
        let workers = pool.join().await;

        let summary = SyncSummary {
            outcome: producer.outcome,
            pages: producer.pages,
            dispatched: producer.dispatched,
            upserted: workers.upserted,
            failed: workers.failed,
        };

        if summary.outcome.is_clean() {
            tracing::info!(?summary, "sync completed");
        } else {
            tracing::error!(?summary, "sync aborted");
        }
        summary
    }
}
