//! Actor identity normalization.
//!
//! Every event row stores a canonical `actor_id` UUID. Callers may pass an
//! arbitrary UUID string or one of five recognized role names; role names
//! map to fixed sentinel UUIDs via [`resolve_actor`]. The sentinel values
//! are part of the stored data contract and must never change once deployed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Sentinel actors
// ---------------------------------------------------------------------------

/// The platform itself (migrations, fallbacks, unattributed writes).
pub const ACTOR_SYSTEM: Uuid = uuid!("00000000-0000-0000-0000-000000000001");

/// Third-party webhook deliveries re-published as domain events.
pub const ACTOR_WEBHOOK: Uuid = uuid!("00000000-0000-0000-0000-000000000002");

/// Scheduled jobs.
pub const ACTOR_CRON: Uuid = uuid!("00000000-0000-0000-0000-000000000003");

/// Machine-to-machine API callers.
pub const ACTOR_API: Uuid = uuid!("00000000-0000-0000-0000-000000000004");

/// Organization-level automation acting on behalf of a tenant.
pub const ACTOR_ORGANIZATION: Uuid = uuid!("00000000-0000-0000-0000-000000000005");

// ---------------------------------------------------------------------------
// ActorType
// ---------------------------------------------------------------------------

/// Closed set of actor kinds stored in the `actor_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    User,
    System,
    Webhook,
    Cron,
    Api,
}

impl ActorType {
    /// Column value for this actor type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::System => "system",
            ActorType::Webhook => "webhook",
            ActorType::Cron => "cron",
            ActorType::Api => "api",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ActorType::User),
            "system" => Ok(ActorType::System),
            "webhook" => Ok(ActorType::Webhook),
            "cron" => Ok(ActorType::Cron),
            "api" => Ok(ActorType::Api),
            other => Err(CoreError::Validation(format!(
                "unknown actor type: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Normalize a caller-supplied actor identifier to a canonical UUID.
///
/// - A valid UUID string passes through unchanged.
/// - The role names `system`, `webhook`, `cron`, `api`, and `organization`
///   map to their fixed sentinel constants.
/// - Anything else is coerced to [`ACTOR_SYSTEM`] with a warning.
///
/// Publishing must never fail because of an unrecognized actor, so this is
/// fail-safe rather than fail-closed. Idempotent: resolving an already
/// canonical UUID is a no-op.
pub fn resolve_actor(actor: &str) -> Uuid {
    if let Ok(id) = Uuid::parse_str(actor) {
        return id;
    }

    match actor {
        "system" => ACTOR_SYSTEM,
        "webhook" => ACTOR_WEBHOOK,
        "cron" => ACTOR_CRON,
        "api" => ACTOR_API,
        "organization" => ACTOR_ORGANIZATION,
        other => {
            tracing::warn!(actor = other, "Unrecognized actor, coercing to system sentinel");
            ACTOR_SYSTEM
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
