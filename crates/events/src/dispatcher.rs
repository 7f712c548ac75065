//! Sequential fan-out of one event to its registered handlers.
//!
//! Handlers run one at a time in priority order, so a later handler may rely
//! on an earlier handler's completed side effects. A handler error is caught
//! and recorded — the remaining handlers still run — but it marks the whole
//! dispatch failed so the outbox worker retries the row. "Success" therefore
//! means every handler future completed without an error.

use praxis_db::models::EventRecord;

use crate::registry::{HandlerRegistry, Propagation};

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// A single handler failure within one dispatch.
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: String,
    pub message: String,
}

/// Result of fanning one event out to its handlers.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Handlers actually invoked (may be short of the registered count when
    /// propagation was stopped).
    pub handlers_run: usize,

    /// Failures collected across the dispatch, in execution order.
    pub failures: Vec<HandlerFailure>,

    /// Whether a stop signal cut the fan-out short.
    pub stopped_early: bool,
}

impl DispatchOutcome {
    /// True when no handler returned an error. Zero handlers is a success.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Combined failure message suitable for the `last_error` column.
    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(
            self.failures
                .iter()
                .map(|f| format!("{}: {}", f.handler, f.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Executes the registered handlers for one hydrated event.
pub struct Dispatcher;

impl Dispatcher {
    /// Fan the event out to every handler registered for its type.
    ///
    /// Absence of handlers is a valid no-op. Handler errors are isolated:
    /// they are logged and collected, and execution continues with the next
    /// handler. A `Propagation::Stop` return or a `stop_propagation`
    /// registration halts the remaining handlers for this dispatch only.
    pub async fn dispatch(registry: &HandlerRegistry, event: &EventRecord) -> DispatchOutcome {
        let registrations = registry.handlers_for(&event.event_type);
        let mut outcome = DispatchOutcome::default();

        if registrations.is_empty() {
            tracing::debug!(
                event_id = %event.event_id,
                event_type = %event.event_type,
                "No handlers registered for event"
            );
            return outcome;
        }

        for registration in registrations {
            outcome.handlers_run += 1;

            match registration.handler.handle(event).await {
                Ok(Propagation::Continue) => {}
                Ok(Propagation::Stop) => {
                    tracing::debug!(
                        event_id = %event.event_id,
                        handler = registration.handler.name(),
                        "Handler stopped propagation"
                    );
                    outcome.stopped_early = true;
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        handler = registration.handler.name(),
                        error = %e,
                        "Event handler failed"
                    );
                    outcome.failures.push(HandlerFailure {
                        handler: registration.handler.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }

            if registration.stop_propagation {
                outcome.stopped_early = true;
                break;
            }
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
