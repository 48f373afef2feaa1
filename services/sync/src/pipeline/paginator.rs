use std::sync::Arc;
use std::time::Duration;

use async_channel::Sender;
use ghusers_config::SyncConfig;
use ghusers_db::users::models::User;
use ghusers_github::{GitHubClientError, GitHubUser, UserSource};
use tokio_util::sync::CancellationToken;

use super::cursor::Cursor;

/// Why the producer stopped fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerOutcome {
    /// Upstream returned enough consecutive empty pages.
    Exhausted,
    RetriesExhausted {
        attempts: u32,
        cursor: i64,
        last_error: String,
    },
    Cancelled {
        cursor: i64,
    },
    /// Every worker went away while records were still being dispatched.
    ChannelClosed {
        cursor: i64,
    },
}

impl ProducerOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerReport {
    pub outcome: ProducerOutcome,
    pub pages: u64,
    pub dispatched: u64,
}

enum FetchFailure {
    RetriesExhausted { attempts: u32, last_error: String },
    Cancelled,
}

/// Walks the upstream user listing page by page and feeds mapped users into
/// the dispatch channel.
pub struct Paginator<S: ?Sized> {
    source: Arc<S>,
    cursor: Cursor,
    page_size: u32,
    max_attempts: u32,
    backoff_unit: Duration,
    max_consecutive_empty: u32,
    cancel: CancellationToken,
}

impl<S> Paginator<S>
where
    S: UserSource + ?Sized,
{
    pub fn new(source: Arc<S>, config: &SyncConfig, cancel: CancellationToken) -> Self {
        Self {
            source,
            cursor: Cursor::new(config.start_since),
            page_size: config.page_size,
            max_attempts: config.max_fetch_attempts,
            backoff_unit: config.backoff_unit,
            max_consecutive_empty: config.max_consecutive_empty,
            cancel,
        }
    }

    /// Runs until a stop condition is hit. Consumes `tx`, so the channel
    /// closes as soon as this returns.
    pub async fn run(mut self, tx: Sender<User>) -> ProducerReport {
        let mut pages = 0u64;
        let mut dispatched = 0u64;
        let mut empty_streak = 0u32;

        let outcome = 'pages: loop {
            if self.cancel.is_cancelled() {
                break ProducerOutcome::Cancelled {
                    cursor: self.cursor.value(),
                };
            }

            let since = self.cursor.value();
            let batch = match self.fetch_page(since).await {
                Ok(batch) => batch,
                Err(FetchFailure::Cancelled) => {
                    break ProducerOutcome::Cancelled { cursor: since };
                }
                Err(FetchFailure::RetriesExhausted {
                    attempts,
                    last_error,
                }) => {
                    tracing::error!(since, attempts, error = %last_error, "giving up on page fetch");
                    break ProducerOutcome::RetriesExhausted {
                        attempts,
                        cursor: since,
                        last_error,
                    };
                }
            };
            pages += 1;

            if batch.is_empty() {
                empty_streak += 1;
                tracing::debug!(since, empty_streak, "empty page");
                if empty_streak >= self.max_consecutive_empty {
                    break ProducerOutcome::Exhausted;
                }
                continue;
            }
            empty_streak = 0;

            let count = batch.len();

            // The cursor only covers records that actually reached the channel.
            for record in batch {
                let user = User::from(record);
                let id = user.id;
                let sent = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    res = tx.send(user) => Some(res),
                };
                match sent {
                    Some(Ok(())) => {
                        self.cursor.advance([id]);
                        dispatched += 1;
                    }
                    Some(Err(_)) => {
                        let cursor = self.cursor.value();
                        tracing::error!(cursor, "dispatch channel closed by consumers");
                        break 'pages ProducerOutcome::ChannelClosed { cursor };
                    }
                    None => {
                        break 'pages ProducerOutcome::Cancelled {
                            cursor: self.cursor.value(),
                        }
                    }
                }
            }

            let next = self.cursor.value();
            tracing::info!(since, next, count, "page dispatched");
        };

        ProducerReport {
            outcome,
            pages,
            dispatched,
        }
    }

    async fn fetch_page(&self, since: i64) -> Result<Vec<GitHubUser>, FetchFailure> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(FetchFailure::Cancelled),
                res = self.source.fetch_users_since(since, self.page_size) => res,
            };

            match result {
                Ok(batch) => return Ok(batch),
                Err(GitHubClientError::Cancelled) => return Err(FetchFailure::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        since,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "page fetch failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.max_attempts {
                let backoff = self.backoff_unit * attempt;
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(FetchFailure::Cancelled),
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }

        Err(FetchFailure::RetriesExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
