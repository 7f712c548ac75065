//! Integration tests for the event store repository.
//!
//! Exercises the outbox contract against a real database:
//! - Transactional insert visibility (commit vs. rollback)
//! - Actor sentinel normalization at the storage boundary
//! - Poll ordering and batch limits
//! - Retry bookkeeping and replay reset

use praxis_core::actor::ACTOR_WEBHOOK;
use praxis_core::ActorType;
use praxis_db::models::NewEvent;
use praxis_db::repositories::EventRepo;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_event(event_type: &str) -> NewEvent {
    NewEvent::new(event_type, "system", ActorType::System)
}

// ---------------------------------------------------------------------------
// Transactional visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn committed_transaction_persists_one_unprocessed_row(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let event_id = EventRepo::insert(&mut *tx, &new_event("practice.created"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id)
        .await
        .unwrap()
        .expect("committed event should be visible");
    assert_eq!(row.event_type, "practice.created");
    assert_eq!(row.event_version, "1.0.0");
    assert!(!row.processed);
    assert_eq!(row.retry_count, 0);
    assert!(row.last_error.is_none());
    assert!(row.processed_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn rolled_back_transaction_leaves_no_row(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let event_id = EventRepo::insert(&mut *tx, &new_event("practice.created"))
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap();
    assert!(row.is_none(), "rolled back event must not exist");
    assert_eq!(EventRepo::unprocessed_count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Actor normalization at the storage boundary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn webhook_role_name_is_stored_as_sentinel_uuid(pool: PgPool) {
    let event = NewEvent::new("webhook.received", "webhook", ActorType::Webhook);
    let event_id = EventRepo::insert(&pool, &event).await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap().unwrap();
    assert_eq!(row.actor_id, ACTOR_WEBHOOK);
    assert_eq!(row.actor_type, "webhook");
}

// ---------------------------------------------------------------------------
// Poll ordering and limits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn fetch_unprocessed_is_oldest_first_and_bounded(pool: PgPool) {
    let mut inserted = Vec::new();
    for i in 0..15 {
        let event = new_event("payment.succeeded")
            .with_payload(serde_json::json!({"seq": i}));
        inserted.push(EventRepo::insert(&pool, &event).await.unwrap());
        // Distinct created_at values so the ordering assertion is meaningful.
        sqlx::query("UPDATE events SET created_at = NOW() + ($2 || ' milliseconds')::interval WHERE event_id = $1")
            .bind(inserted[i])
            .bind((i as i64).to_string())
            .execute(&pool)
            .await
            .unwrap();
    }

    let first = EventRepo::fetch_unprocessed(&pool, 10).await.unwrap();
    assert_eq!(first.len(), 10);
    let first_ids: Vec<_> = first.iter().map(|e| e.event_id).collect();
    assert_eq!(first_ids, inserted[..10].to_vec());

    for event in &first {
        EventRepo::mark_processed(&pool, event.event_id).await.unwrap();
    }

    let second = EventRepo::fetch_unprocessed(&pool, 10).await.unwrap();
    assert_eq!(second.len(), 5);
    let second_ids: Vec<_> = second.iter().map(|e| e.event_id).collect();
    assert_eq!(second_ids, inserted[10..].to_vec());
}

// ---------------------------------------------------------------------------
// Retry bookkeeping and replay
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn record_failure_increments_and_keeps_row_eligible(pool: PgPool) {
    let event_id = EventRepo::insert(&pool, &new_event("payment.failed"))
        .await
        .unwrap();

    EventRepo::record_failure(&pool, event_id, "handler exploded").await.unwrap();
    EventRepo::record_failure(&pool, event_id, "handler exploded again").await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap().unwrap();
    assert!(!row.processed);
    assert_eq!(row.retry_count, 2);
    assert_eq!(row.last_error.as_deref(), Some("handler exploded again"));

    // Still selected by the poll query.
    let pending = EventRepo::fetch_unprocessed(&pool, 10).await.unwrap();
    assert!(pending.iter().any(|e| e.event_id == event_id));
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_processed_sets_timestamp_and_hides_from_poll(pool: PgPool) {
    let event_id = EventRepo::insert(&pool, &new_event("user.registered"))
        .await
        .unwrap();

    EventRepo::mark_processed(&pool, event_id).await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap().unwrap();
    assert!(row.processed);
    assert!(row.processed_at.is_some());
    assert_eq!(EventRepo::unprocessed_count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reset_for_replay_requeues_a_processed_row(pool: PgPool) {
    let event_id = EventRepo::insert(&pool, &new_event("practice.created"))
        .await
        .unwrap();
    EventRepo::mark_processed(&pool, event_id).await.unwrap();

    EventRepo::reset_for_replay(&pool, event_id).await.unwrap();

    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap().unwrap();
    assert!(!row.processed);
    assert!(row.processed_at.is_none());
    let pending = EventRepo::fetch_unprocessed(&pool, 10).await.unwrap();
    assert!(pending.iter().any(|e| e.event_id == event_id));
}

// ---------------------------------------------------------------------------
// Organization scope
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_an_organization_nulls_the_event_scope(pool: PgPool) {
    let org_id = Uuid::new_v4();
    sqlx::query("INSERT INTO organizations (organization_id, name) VALUES ($1, $2)")
        .bind(org_id)
        .bind("North Clinic")
        .execute(&pool)
        .await
        .unwrap();

    let event = new_event("practice.created").with_organization(org_id);
    let event_id = EventRepo::insert(&pool, &event).await.unwrap();

    sqlx::query("DELETE FROM organizations WHERE organization_id = $1")
        .bind(org_id)
        .execute(&pool)
        .await
        .unwrap();

    // ON DELETE SET NULL: the event row survives, only the scope is cleared.
    let row = EventRepo::find_by_id(&pool, event_id).await.unwrap().unwrap();
    assert!(row.organization_id.is_none());
}
