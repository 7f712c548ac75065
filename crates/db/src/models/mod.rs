pub mod event;

pub use event::{EventMetadata, EventRecord, NewEvent, DEFAULT_EVENT_VERSION};
