//! Repository for the `events` table.
//!
//! [`EventRepo::insert`] takes a generic executor so the same statement can
//! run against a pool or inside a caller's open transaction — the latter is
//! how the transactional publish contract joins a business transaction.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use praxis_core::types::EventId;

use crate::models::event::{EventRecord, NewEvent};

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "event_id, type, event_version, actor_id, actor_type, \
     organization_id, payload, metadata, processed, retry_count, last_error, \
     processed_at, created_at";

/// Provides read/write operations for event rows.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event row, returning the generated `event_id`.
    ///
    /// Accepts any Postgres executor; pass `&mut *tx` to make the insert
    /// part of an open transaction. Failures propagate to the caller.
    pub async fn insert<'e, E>(executor: E, event: &NewEvent) -> Result<EventId, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_id, type, event_version, actor_id, actor_type, \
                 organization_id, payload, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING event_id",
        )
        .bind(Uuid::new_v4())
        .bind(&event.event_type)
        .bind(&event.event_version)
        .bind(event.actor_id)
        .bind(event.actor_type.as_str())
        .bind(event.organization_id)
        .bind(&event.payload)
        .bind(&event.metadata)
        .fetch_one(executor)
        .await
    }

    /// Fetch a single event by id.
    pub async fn find_by_id(
        pool: &PgPool,
        event_id: EventId,
    ) -> Result<Option<EventRecord>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");
        sqlx::query_as::<_, EventRecord>(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch up to `limit` unprocessed events, oldest first.
    ///
    /// This is the outbox poll query. Oldest-first ordering gives per-type
    /// delivery order and keeps a growing backlog fair.
    pub async fn fetch_unprocessed(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<EventRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE processed = FALSE \
             ORDER BY created_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, EventRecord>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark an event successfully processed.
    pub async fn mark_processed(pool: &PgPool, event_id: EventId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET processed = TRUE, processed_at = NOW() WHERE event_id = $1")
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a dispatch failure: bump the retry counter and keep the row
    /// eligible for the next poll.
    pub async fn record_failure(
        pool: &PgPool,
        event_id: EventId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE events SET retry_count = retry_count + 1, last_error = $2 \
             WHERE event_id = $1",
        )
        .bind(event_id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reset a processed event so the worker picks it up again.
    ///
    /// Rows are never deleted; this is the sanctioned replay mechanism.
    /// Handlers must tolerate duplicate application.
    pub async fn reset_for_replay(pool: &PgPool, event_id: EventId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE events SET processed = FALSE, processed_at = NULL WHERE event_id = $1",
        )
        .bind(event_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count rows still awaiting processing (backlog gauge).
    pub async fn unprocessed_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE processed = FALSE")
            .fetch_one(pool)
            .await
    }

    /// List recent events ordered newest-first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, EventRecord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
