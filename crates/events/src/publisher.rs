//! Event publishing contracts.
//!
//! Two ways to get a row into the event store:
//!
//! - [`EventPublisher::publish_event_tx`] — inside the caller's open
//!   transaction. The event commits or rolls back atomically with the
//!   business change; insert failures propagate and abort the caller's
//!   transaction. This is the default contract.
//! - [`EventPublisher::publish_simple_event`] — fire-and-forget, for flows
//!   whose primary effect is an external call that cannot join the local
//!   transaction. Failures are logged and counted, never surfaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use praxis_core::types::EventId;
use praxis_core::ActorType;
use praxis_db::models::NewEvent;
use praxis_db::repositories::EventRepo;
use praxis_db::DbPool;

use crate::wakeup::WakeupSender;

// ---------------------------------------------------------------------------
// Errors & stats
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The event row insert failed; inside a transaction this aborts the
    /// caller's transaction.
    #[error("Failed to insert event row: {0}")]
    Insert(#[from] sqlx::Error),
}

/// Publish counters, readable by tests and operators.
///
/// The fire-and-forget path swallows its errors, so `failed` is the only
/// place those failures remain observable besides the log.
#[derive(Debug, Default)]
pub struct PublishStats {
    published: AtomicU64,
    failed: AtomicU64,
}

impl PublishStats {
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// EventPublisher
// ---------------------------------------------------------------------------

/// Writes event rows to the event store.
pub struct EventPublisher {
    pool: DbPool,
    wakeup: Option<WakeupSender>,
    stats: Arc<PublishStats>,
}

impl EventPublisher {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            wakeup: None,
            stats: Arc::new(PublishStats::default()),
        }
    }

    /// Attach the wake-up bridge so successful fire-and-forget publishes
    /// nudge the worker immediately.
    pub fn with_wakeup(mut self, wakeup: WakeupSender) -> Self {
        self.wakeup = Some(wakeup);
        self
    }

    pub fn stats(&self) -> Arc<PublishStats> {
        self.stats.clone()
    }

    /// Publish an event inside the caller's open transaction.
    ///
    /// If the transaction commits, the event is durably persisted atomically
    /// with the business change; if it rolls back, no row exists. Errors
    /// propagate so the caller's transaction aborts.
    pub async fn publish_event_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &NewEvent,
    ) -> Result<EventId, PublishError> {
        match EventRepo::insert(&mut **tx, event).await {
            Ok(event_id) => {
                self.stats.record_published();
                tracing::debug!(
                    event_id = %event_id,
                    event_type = %event.event_type,
                    "Published event transactionally"
                );
                Ok(event_id)
            }
            Err(e) => {
                self.stats.record_failed();
                Err(e.into())
            }
        }
    }

    /// Publish an event outside any transaction, never failing the caller.
    ///
    /// Insert errors are logged and counted, then swallowed — the primary
    /// operation must not be blocked by event bookkeeping. On success the
    /// wake-up bridge is nudged best-effort.
    pub async fn publish_simple_event(
        &self,
        event_type: &str,
        actor: &str,
        organization_id: Option<Uuid>,
        payload: serde_json::Value,
    ) {
        let mut event =
            NewEvent::new(event_type, actor, infer_actor_type(actor)).with_payload(payload);
        if let Some(org) = organization_id {
            event = event.with_organization(org);
        }

        match EventRepo::insert(&self.pool, &event).await {
            Ok(event_id) => {
                self.stats.record_published();
                tracing::debug!(
                    event_id = %event_id,
                    event_type = %event.event_type,
                    "Published simple event"
                );
                if let Some(wakeup) = &self.wakeup {
                    wakeup.nudge();
                }
            }
            Err(e) => {
                self.stats.record_failed();
                tracing::error!(
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to publish simple event, swallowing"
                );
            }
        }
    }
}

/// Derive the actor type for the simple-publish contract, which does not
/// take one explicitly. Role names map to their kind; `organization` is
/// platform automation, so it records as `system`; a plain UUID is a user.
fn infer_actor_type(actor: &str) -> ActorType {
    match actor {
        "system" | "organization" => ActorType::System,
        "webhook" => ActorType::Webhook,
        "cron" => ActorType::Cron,
        "api" => ActorType::Api,
        _ => ActorType::User,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
