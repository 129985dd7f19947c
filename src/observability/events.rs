//! Observable events for docshape
//!
//! Events are explicit and typed. Each one maps to a stable
//! SCREAMING_SNAKE name that appears as the `event` key of a log line.

use std::fmt;

use super::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Source loading
    /// A schema or function file was parsed
    SourceParsed,
    /// An index declaration was accepted but carries no query semantics here
    IndexDeclared,

    // Schema registry
    /// Collection registered
    CollectionRegistered,
    /// Registry frozen, ready to validate
    RegistryFrozen,

    // Functions
    /// Endpoint registered
    FunctionRegistered,

    // Writes and calls
    /// Document or argument set rejected by its type
    ValidationRejected,
    /// Document committed to a store
    DocumentCommitted,

    // Codegen
    /// Generated Rust written
    CodegenWritten,

    /// Startup aborted on a fatal error
    StartupFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SourceParsed => "SOURCE_PARSED",
            Event::IndexDeclared => "INDEX_DECLARED",
            Event::CollectionRegistered => "COLLECTION_REGISTERED",
            Event::RegistryFrozen => "REGISTRY_FROZEN",
            Event::FunctionRegistered => "FUNCTION_REGISTERED",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::DocumentCommitted => "DOCUMENT_COMMITTED",
            Event::CodegenWritten => "CODEGEN_WRITTEN",
            Event::StartupFailed => "STARTUP_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::StartupFailed => Severity::Fatal,
            Event::ValidationRejected => Severity::Warn,
            Event::DocumentCommitted | Event::IndexDeclared => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SourceParsed,
            Event::IndexDeclared,
            Event::CollectionRegistered,
            Event::RegistryFrozen,
            Event::FunctionRegistered,
            Event::ValidationRejected,
            Event::DocumentCommitted,
            Event::CodegenWritten,
            Event::StartupFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::StartupFailed.is_fatal());
        assert!(!Event::RegistryFrozen.is_fatal());
        assert!(!Event::ValidationRejected.is_fatal());
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::ValidationRejected.severity(), Severity::Warn);
        assert_eq!(Event::CollectionRegistered.severity(), Severity::Info);
        assert_eq!(Event::DocumentCommitted.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::RegistryFrozen), "REGISTRY_FROZEN");
    }
}
