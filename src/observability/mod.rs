//! Observability subsystem for pdxsql
//!
//! Structured JSON logging and lifecycle tracing for catalog loading,
//! plan compilation and query execution.
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//!
//! ```ignore
//! use pdxsql::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::TableLoaded, &[("table", "customer"), ("rows", "42")]);
//!
//! let scope = ObservationScope::new("QUERY");
//! // ... run ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

#[cfg(test)]
pub(crate) use logger::take_captured;

fn severity_of(event: Event) -> Severity {
    match event {
        Event::QueryCancelled => Severity::Warn,
        Event::ConditionPushed
        | Event::TableLoaded
        | Event::JoinCompleted
        | Event::BlobResolved
        | Event::ComparisonFallback => Severity::Trace,
        _ => Severity::Info,
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        assert_eq!(severity_of(Event::QueryCancelled), Severity::Warn);
        assert_eq!(severity_of(Event::TableLoaded), Severity::Trace);
        assert_eq!(severity_of(Event::CatalogLoaded), Severity::Info);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event(Event::QueryCompiled);
        log_event_with_fields(Event::CatalogLoaded, &[("data_dir", "/tmp/test")]);
    }
}
