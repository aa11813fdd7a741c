//! Observability for the storefront service
//!
//! - Structured logs (JSON), one line per event
//! - Deterministic key ordering
//! - Typed events; no free-form event names
//!
//! # Usage
//!
//! ```ignore
//! use storefront::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CatalogListed, &[("total", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log_at(event.severity(), event.as_str(), fields);
}
