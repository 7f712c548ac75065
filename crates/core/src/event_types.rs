//! Well-known event type name constants.
//!
//! These are the taxonomy keys stored in the `events.type` column. Call
//! sites should use the constants rather than scattering string literals;
//! the dispatcher itself treats the type as an opaque key, so new types can
//! be added without touching the core.

/// A practice (tenant workspace) was created.
pub const EVENT_PRACTICE_CREATED: &str = "practice.created";

/// A payment settled successfully.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment.succeeded";

/// A payment attempt failed.
pub const EVENT_PAYMENT_FAILED: &str = "payment.failed";

/// A new user completed registration.
pub const EVENT_USER_REGISTERED: &str = "user.registered";

/// An organization (billing tenant) was created.
pub const EVENT_ORGANIZATION_CREATED: &str = "organization.created";

/// A verified third-party webhook was re-published as a domain event.
pub const EVENT_WEBHOOK_RECEIVED: &str = "webhook.received";
