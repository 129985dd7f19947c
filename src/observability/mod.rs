//! Observability for docshape
//!
//! Structured JSON-line logging of lifecycle events. Logging is
//! read-only: it never changes the outcome of the operation it reports,
//! and a failed write is dropped.
//!
//! Only registry setup, source loading, store commits and CLI commands
//! log. Validation itself performs no I/O.
//!
//! # Usage
//!
//! ```ignore
//! use docshape::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CollectionRegistered, &[("collection", "games")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, ParseSeverityError, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
