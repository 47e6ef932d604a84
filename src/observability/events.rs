//! Observable events of a cost estimation run
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Inputs
    /// Input files loaded
    WorkloadLoaded,
    /// Run configuration loaded
    ConfigLoaded,

    // Per design
    DesignBegin,
    DesignComplete,
    /// Model build failed or a query failed under the abort policy
    DesignFailed,

    // Per query
    QueryPlanned,
    QuerySimulated,
    /// Planning or simulation rejected the query
    QueryRejected,

    // Outputs
    ReportWritten,
    RunComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::WorkloadLoaded => "WORKLOAD_LOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DesignBegin => "DESIGN_BEGIN",
            Event::DesignComplete => "DESIGN_COMPLETE",
            Event::DesignFailed => "DESIGN_FAILED",
            Event::QueryPlanned => "QUERY_PLANNED",
            Event::QuerySimulated => "QUERY_SIMULATED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::ReportWritten => "REPORT_WRITTEN",
            Event::RunComplete => "RUN_COMPLETE",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryPlanned | Event::QuerySimulated => Severity::Trace,
            Event::QueryRejected | Event::DesignFailed => Severity::Warn,
            _ => Severity::Info,
        }
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
            Event::WorkloadLoaded,
            Event::ConfigLoaded,
            Event::DesignBegin,
            Event::DesignComplete,
            Event::DesignFailed,
            Event::QueryPlanned,
            Event::QuerySimulated,
            Event::QueryRejected,
            Event::ReportWritten,
            Event::RunComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::QueryRejected.severity(), Severity::Warn);
        assert_eq!(Event::QuerySimulated.severity(), Severity::Trace);
        assert_eq!(Event::RunComplete.severity(), Severity::Info);
    }
}
