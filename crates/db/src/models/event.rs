//! Event row model and the publish descriptor.

use praxis_core::actor::resolve_actor;
use praxis_core::types::{EventId, Timestamp};
use praxis_core::ActorType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Semver applied to events published without an explicit version.
pub const DEFAULT_EVENT_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// A row from the `events` table.
///
/// Append-only except for `processed`, `processed_at`, `retry_count`, and
/// `last_error`, which the outbox worker owns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRecord {
    pub event_id: EventId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_version: String,
    pub actor_id: Uuid,
    pub actor_type: String,
    pub organization_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Value,
    pub processed: bool,
    pub retry_count: i32,
    pub last_error: Option<String>,
    pub processed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// EventMetadata
// ---------------------------------------------------------------------------

/// Contents of the `metadata` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Subsystem that published the event (e.g. `"praxis-api"`).
    pub source: String,

    /// Deployment environment the event originated in.
    pub environment: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self {
            source: "praxis".to_string(),
            environment: std::env::var("ENVIRONMENT")
                .or_else(|_| std::env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            ip: None,
            user_agent: None,
            request_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// NewEvent
// ---------------------------------------------------------------------------

/// Descriptor for an event about to be published.
///
/// Constructed via [`NewEvent::new`] and enriched with the builder methods.
/// The actor string is normalized through
/// [`resolve_actor`](praxis_core::actor::resolve_actor) at construction, so
/// `actor_id` is always canonical by the time a row is written.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: String,
    pub event_version: String,
    pub actor_id: Uuid,
    pub actor_type: ActorType,
    pub organization_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Value,
}

impl NewEvent {
    /// Create a descriptor with the required fields.
    ///
    /// `actor` accepts a UUID string or a recognized role name; payload and
    /// metadata default to an empty object / default metadata.
    pub fn new(event_type: impl Into<String>, actor: &str, actor_type: ActorType) -> Self {
        Self {
            event_type: event_type.into(),
            event_version: DEFAULT_EVENT_VERSION.to_string(),
            actor_id: resolve_actor(actor),
            actor_type,
            organization_id: None,
            payload: serde_json::Value::Object(Default::default()),
            metadata: serde_json::to_value(EventMetadata::default())
                .unwrap_or(serde_json::Value::Null),
        }
    }

    /// Scope the event to a tenant organization.
    pub fn with_organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Replace the default metadata.
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = serde_json::to_value(metadata).unwrap_or(serde_json::Value::Null);
        self
    }

    /// Override the default `1.0.0` event version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.event_version = version.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_core::actor::ACTOR_WEBHOOK;
    use praxis_core::event_types::EVENT_PAYMENT_SUCCEEDED;

    #[test]
    fn new_event_defaults() {
        let event = NewEvent::new(EVENT_PAYMENT_SUCCEEDED, "webhook", ActorType::Webhook);
        assert_eq!(event.event_type, "payment.succeeded");
        assert_eq!(event.event_version, DEFAULT_EVENT_VERSION);
        assert_eq!(event.actor_id, ACTOR_WEBHOOK);
        assert!(event.organization_id.is_none());
        assert!(event.payload.is_object());
    }

    #[test]
    fn builder_methods_apply() {
        let org = Uuid::new_v4();
        let event = NewEvent::new("practice.created", "system", ActorType::System)
            .with_organization(org)
            .with_payload(serde_json::json!({"practice_name": "North Clinic"}))
            .with_version("2.1.0");

        assert_eq!(event.organization_id, Some(org));
        assert_eq!(event.payload["practice_name"], "North Clinic");
        assert_eq!(event.event_version, "2.1.0");
    }

    #[test]
    fn uuid_actor_is_preserved() {
        let user = Uuid::new_v4();
        let event = NewEvent::new("user.registered", &user.to_string(), ActorType::User);
        assert_eq!(event.actor_id, user);
    }

    #[test]
    fn environment_variable_takes_precedence_over_app_env() {
        std::env::set_var("ENVIRONMENT", "staging");
        std::env::set_var("APP_ENV", "ignored");

        let metadata = EventMetadata::default();
        assert_eq!(metadata.environment, "staging");

        std::env::remove_var("ENVIRONMENT");
        std::env::remove_var("APP_ENV");
    }

    #[test]
    fn metadata_omits_absent_optionals() {
        let event = NewEvent::new("practice.created", "system", ActorType::System);
        let obj = event.metadata.as_object().expect("metadata should be an object");
        assert!(obj.contains_key("source"));
        assert!(obj.contains_key("environment"));
        assert!(!obj.contains_key("ip"));
        assert!(!obj.contains_key("request_id"));
    }
}
