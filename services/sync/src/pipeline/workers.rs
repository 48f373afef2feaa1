use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use ghusers_db::users::models::User;
use ghusers_db::users::repositories::UserSink;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub upserted: u64,
    pub failed: u64,
}

impl WorkerReport {
    fn merge(&mut self, other: WorkerReport) {
        self.upserted += other.upserted;
        self.failed += other.failed;
    }
}

/// Fixed set of tasks draining the dispatch channel into a [`UserSink`].
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    pub fn spawn<K>(count: usize, rx: Receiver<User>, sink: Arc<K>, delay: Duration) -> Self
    where
        K: UserSink + ?Sized + 'static,
    {
        let handles = (0..count)
            .map(|worker| {
                let rx = rx.clone();
                let sink = Arc::clone(&sink);
                tokio::spawn(run_worker(worker, rx, sink, delay))
            })
            .collect();
        Self { handles }
    }

    /// Waits for every worker to see the channel closed and drained.
    pub async fn join(self) -> WorkerReport {
        let mut total = WorkerReport::default();
        for (worker, handle) in self.handles.into_iter().enumerate() {
            match handle.await {
                Ok(report) => total.merge(report),
                Err(e) => tracing::error!(worker, error = %e, "sync worker panicked"),
            }
        }
        total
    }
}

async fn run_worker<K>(worker: usize, rx: Receiver<User>, sink: Arc<K>, delay: Duration) -> WorkerReport
where
    K: UserSink + ?Sized,
{
    let mut report = WorkerReport::default();

    while let Ok(user) = rx.recv().await {
        match sink.upsert(&user).await {
            Ok(()) => report.upserted += 1,
            Err(e) => {
                tracing::warn!(worker, user_id = user.id, login = %user.login, error = %e, "upsert failed");
                report.failed += 1;
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::debug!(worker, upserted = report.upserted, failed = report.failed, "worker finished");
    report
}
