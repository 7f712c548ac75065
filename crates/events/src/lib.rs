//! Praxis event publishing and delivery infrastructure.
//!
//! This crate implements the transactional outbox pattern around the
//! `events` table owned by `praxis-db`:
//!
//! - [`EventPublisher`] — writes event rows, transactionally (atomic with
//!   the business change) or fire-and-forget.
//! - [`HandlerRegistry`] / [`EventHandler`] — boot-time subscriber
//!   registration, priority-ordered per event type.
//! - [`Dispatcher`] — sequential fan-out of one event to its handlers with
//!   per-handler fault isolation.
//! - [`OutboxWorker`] — polls for unprocessed rows and drives at-least-once
//!   delivery with retry bookkeeping.
//! - [`wakeup`] — advisory bridge that nudges the worker right after a
//!   publish instead of waiting for the next scheduled poll.

pub mod dispatcher;
pub mod outbox;
pub mod publisher;
pub mod registry;
pub mod wakeup;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use outbox::{BatchStats, OutboxWorker};
pub use publisher::{EventPublisher, PublishError, PublishStats};
pub use registry::{EventHandler, HandlerRegistry, Propagation, SubscribeOptions};
pub use wakeup::{WakeupReceiver, WakeupSender};
