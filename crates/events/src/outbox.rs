//! Polling outbox worker.
//!
//! [`OutboxWorker`] drives at-least-once delivery: each pass selects a
//! bounded batch of unprocessed rows oldest-first, dispatches each one, and
//! records the outcome. Retries are unbounded — a permanently failing row
//! stays unprocessed and is retried every poll, observable via
//! `retry_count` / `last_error`. Handlers must be idempotent.
//!
//! One worker process is assumed: there is no row-level claim or lease, so
//! two concurrent workers could double-process a batch.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use praxis_db::repositories::EventRepo;
use praxis_db::DbPool;

use crate::dispatcher::Dispatcher;
use crate::registry::HandlerRegistry;
use crate::wakeup::WakeupReceiver;

/// Rows fetched per pass.
const DEFAULT_BATCH_SIZE: i64 = 10;

/// Scheduled poll cadence; the wake-up bridge only shortens the wait.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// BatchStats
// ---------------------------------------------------------------------------

/// Outcome counts for one worker pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// OutboxWorker
// ---------------------------------------------------------------------------

/// Background service that delivers unprocessed events to their handlers.
pub struct OutboxWorker {
    pool: DbPool,
    registry: Arc<HandlerRegistry>,
    batch_size: i64,
    poll_interval: Duration,
}

impl OutboxWorker {
    pub fn new(pool: DbPool, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            pool,
            registry,
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poll loop until cancelled.
    ///
    /// A pass runs on every interval tick and on every wake-up nudge. Poll
    /// errors are logged and the loop keeps going — nothing escapes the
    /// worker boundary.
    pub async fn run(&self, cancel: CancellationToken, mut wakeup: WakeupReceiver) {
        let mut interval = tokio::time::interval(self.poll_interval);
        let mut wakeup_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox worker cancelled");
                    break;
                }
                _ = interval.tick() => {}
                nudge = wakeup.recv(), if wakeup_open => {
                    if nudge.is_none() {
                        // All publishers dropped their sender; from here on
                        // only the scheduled poll fires.
                        wakeup_open = false;
                        continue;
                    }
                }
            }

            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Outbox poll failed");
            }
        }
    }

    /// Process up to one batch of unprocessed events.
    ///
    /// Every row is attempted regardless of earlier failures in the batch.
    /// Only the initial poll query error propagates; per-row outcomes are
    /// recorded on the row itself.
    pub async fn run_once(&self) -> Result<BatchStats, sqlx::Error> {
        let batch = EventRepo::fetch_unprocessed(&self.pool, self.batch_size).await?;
        let mut stats = BatchStats {
            fetched: batch.len(),
            ..Default::default()
        };

        for event in &batch {
            let outcome = Dispatcher::dispatch(&self.registry, event).await;

            if outcome.is_success() {
                match EventRepo::mark_processed(&self.pool, event.event_id).await {
                    Ok(()) => stats.succeeded += 1,
                    Err(e) => {
                        // Left unprocessed; the next poll retries it.
                        tracing::error!(
                            event_id = %event.event_id,
                            error = %e,
                            "Failed to mark event processed"
                        );
                        stats.failed += 1;
                    }
                }
            } else {
                let summary = outcome
                    .error_summary()
                    .unwrap_or_else(|| "unknown handler failure".to_string());
                tracing::warn!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    retry_count = event.retry_count + 1,
                    "Event dispatch failed, will retry on a later poll"
                );
                if let Err(e) = EventRepo::record_failure(&self.pool, event.event_id, &summary).await
                {
                    tracing::error!(
                        event_id = %event.event_id,
                        error = %e,
                        "Failed to record dispatch failure"
                    );
                }
                stats.failed += 1;
            }
        }

        if stats.fetched > 0 {
            tracing::info!(
                fetched = stats.fetched,
                succeeded = stats.succeeded,
                failed = stats.failed,
                "Outbox batch complete"
            );
        }

        Ok(stats)
    }
}
