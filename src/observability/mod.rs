//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines on stderr)
//! - Typed run events
//! - Begin/complete scopes with elapsed time
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Parsing, planning and simulation never log; callers log around them
//! 3. No async or background threads
//! 4. Deterministic key ordering
//!
//! # Usage
//!
//! ```ignore
//! use shardcost::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::WorkloadLoaded, &[("designs", "4")]);
//!
//! let scope = ObservationScope::with_fields("DESIGN", &[("design", "D1")]);
//! // ... evaluate ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use scope::{ObservationScope, Timer};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
