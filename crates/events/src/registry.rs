//! In-process handler registry.
//!
//! [`HandlerRegistry`] maps an event type name to an ordered list of
//! subscribers. It is built once at boot by per-domain registration calls,
//! then treated as read-only: the worker receives it behind an `Arc` and no
//! synchronization is needed afterwards. Tests construct a fresh registry
//! per case instead of sharing a global.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use praxis_db::models::EventRecord;

// ---------------------------------------------------------------------------
// EventHandler
// ---------------------------------------------------------------------------

/// Signal returned by a handler to control fan-out for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Run the remaining handlers.
    Continue,
    /// Skip the remaining handlers for this event only.
    Stop,
}

/// A subscriber invoked for each hydrated event of its registered type.
///
/// Handlers must be idempotent: delivery is at-least-once and a replayed or
/// retried event will reach the handler again.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name used in logs and `last_error` messages.
    fn name(&self) -> &str;

    async fn handle(&self, event: &EventRecord) -> anyhow::Result<Propagation>;
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Per-subscription options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Higher priority runs first; ties resolve by registration order.
    pub priority: i32,

    /// Always halt the remaining handlers after this one runs.
    pub stop_propagation: bool,
}

/// One registered subscription for an event type.
pub(crate) struct Registration {
    pub handler: Arc<dyn EventHandler>,
    pub priority: i32,
    pub stop_propagation: bool,
    /// Monotonic registration sequence, the priority tie-breaker.
    order: usize,
}

// ---------------------------------------------------------------------------
// HandlerRegistry
// ---------------------------------------------------------------------------

/// Map from event type to its ordered subscriber list.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Registration>>,
    next_order: usize,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event type.
    ///
    /// Boot-time only by convention; the registry is immutable once handed
    /// to the worker.
    pub fn subscribe(
        &mut self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
        options: SubscribeOptions,
    ) {
        let event_type = event_type.into();
        let order = self.next_order;
        self.next_order += 1;

        tracing::debug!(
            event_type = %event_type,
            handler = handler.name(),
            priority = options.priority,
            "Registered event handler"
        );

        let list = self.handlers.entry(event_type).or_default();
        list.push(Registration {
            handler,
            priority: options.priority,
            stop_propagation: options.stop_propagation,
            order,
        });
        list.sort_by_key(|r| (std::cmp::Reverse(r.priority), r.order));
    }

    /// Handlers for an event type, in execution order. Empty for unknown
    /// types — absence of subscribers is a valid no-op, not an error.
    pub(crate) fn handlers_for(&self, event_type: &str) -> &[Registration] {
        self.handlers
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of handlers registered for an event type.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers_for(event_type).len()
    }

    /// Total subscriptions across all event types (startup logging).
    pub fn total_subscriptions(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
