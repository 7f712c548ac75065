//! Boot-time handler registration.
//!
//! Each domain adds its subscriptions in [`register_handlers`]; the registry
//! is built once in `main` and read-only afterwards.

use std::sync::Arc;

use async_trait::async_trait;

use praxis_core::event_types::{
    EVENT_ORGANIZATION_CREATED, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED,
    EVENT_PRACTICE_CREATED, EVENT_USER_REGISTERED, EVENT_WEBHOOK_RECEIVED,
};
use praxis_db::models::EventRecord;
use praxis_events::{EventHandler, HandlerRegistry, Propagation, SubscribeOptions};

/// Emits an audit line for every delivered event.
///
/// Idempotent by nature: a replayed event just logs again.
struct AuditTrail;

#[async_trait]
impl EventHandler for AuditTrail {
    fn name(&self) -> &str {
        "audit-trail"
    }

    async fn handle(&self, event: &EventRecord) -> anyhow::Result<Propagation> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            actor_id = %event.actor_id,
            organization_id = ?event.organization_id,
            retry_count = event.retry_count,
            "Event delivered"
        );
        Ok(Propagation::Continue)
    }
}

/// Register every subscriber this worker serves.
pub fn register_handlers(registry: &mut HandlerRegistry) {
    let audit = Arc::new(AuditTrail);

    // Negative priority: the audit line runs after the domain handlers.
    for event_type in [
        EVENT_PRACTICE_CREATED,
        EVENT_PAYMENT_SUCCEEDED,
        EVENT_PAYMENT_FAILED,
        EVENT_USER_REGISTERED,
        EVENT_ORGANIZATION_CREATED,
        EVENT_WEBHOOK_RECEIVED,
    ] {
        registry.subscribe(
            event_type,
            audit.clone(),
            SubscribeOptions {
                priority: -100,
                ..Default::default()
            },
        );
    }
}
