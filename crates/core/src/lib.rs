//! Shared types for the praxis event pipeline.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - [`actor`] — actor identity normalization and the sentinel UUID
//!   constants.
//! - [`event_types`] — well-known event type name constants.
//! - [`types`] — scalar type aliases.
//! - [`error`] — the core error enum.
//!
//! No I/O lives here; everything is pure and synchronous.

pub mod actor;
pub mod error;
pub mod event_types;
pub mod types;

pub use actor::{resolve_actor, ActorType};
pub use error::CoreError;
