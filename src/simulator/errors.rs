//! Simulator error types
//!
//! Error codes:
//! - SHARDCOST_UNKNOWN_COLLECTION (REJECT)
//! - SHARDCOST_AGGREGATE_CONFIG (FATAL)
//! - SHARDCOST_MISSING_UPSTREAM (FATAL)
//!
//! FATAL errors mean the plan is internally inconsistent; the planner never
//! produces such plans.

use std::fmt;

/// Severity levels for simulator errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The plan cannot be costed against this design
    Reject,
    /// Internal inconsistency
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Simulator error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationErrorCode {
    /// Operator targets a collection the design does not have
    UnknownCollection,
    /// Aggregate without grouping keys
    AggregateConfig,
    /// Join input is not an earlier filter of the plan
    MissingUpstream,
}

impl SimulationErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SimulationErrorCode::UnknownCollection => "SHARDCOST_UNKNOWN_COLLECTION",
            SimulationErrorCode::AggregateConfig => "SHARDCOST_AGGREGATE_CONFIG",
            SimulationErrorCode::MissingUpstream => "SHARDCOST_MISSING_UPSTREAM",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SimulationErrorCode::UnknownCollection => Severity::Reject,
            SimulationErrorCode::AggregateConfig | SimulationErrorCode::MissingUpstream => {
                Severity::Fatal
            }
        }
    }
}

impl fmt::Display for SimulationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Simulator error type with context
#[derive(Debug, Clone)]
pub struct SimulationError {
    code: SimulationErrorCode,
    message: String,
    /// Operator being simulated
    operator: Option<String>,
}

impl SimulationError {
    pub fn unknown_collection(operator: impl Into<String>, collection: &str) -> Self {
        let op = operator.into();
        Self {
            code: SimulationErrorCode::UnknownCollection,
            message: format!(
                "Operator '{}' targets collection '{}' which is not in the design",
                op, collection
            ),
            operator: Some(op),
        }
    }

    pub fn aggregate_config(operator: impl Into<String>) -> Self {
        let op = operator.into();
        Self {
            code: SimulationErrorCode::AggregateConfig,
            message: format!("Aggregate operator '{}' has no grouping keys", op),
            operator: Some(op),
        }
    }

    pub fn missing_upstream(operator: impl Into<String>, input: usize) -> Self {
        let op = operator.into();
        Self {
            code: SimulationErrorCode::MissingUpstream,
            message: format!(
                "Join '{}' reads operator #{} which is not an earlier filter of its side",
                op, input
            ),
            operator: Some(op),
        }
    }

    pub fn code(&self) -> SimulationErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SimulationError {}

/// Result type for simulator operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SimulationErrorCode::MissingUpstream.code(),
            "SHARDCOST_MISSING_UPSTREAM"
        );
        assert_eq!(SimulationErrorCode::AggregateConfig.severity(), Severity::Fatal);
        assert_eq!(SimulationErrorCode::UnknownCollection.severity(), Severity::Reject);
    }

    #[test]
    fn test_error_display() {
        let err = SimulationError::missing_upstream("Q3_join", 4);
        let display = format!("{}", err);
        assert!(display.starts_with("[FATAL] SHARDCOST_MISSING_UPSTREAM"));
        assert!(display.contains("#4"));
        assert_eq!(err.operator(), Some("Q3_join"));
    }
}
