//! Planner error types
//!
//! Error codes:
//! - SHARDCOST_PARSE_ERROR (REJECT)
//! - SHARDCOST_UNKNOWN_COLLECTION (REJECT)
//! - SHARDCOST_UNSUPPORTED_QUERY (REJECT)
//! - SHARDCOST_AGGREGATE_CONFIG (FATAL)

use std::fmt;

use crate::parser::ParseError;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The query is rejected for this design
    Reject,
    /// Internal inconsistency in plan construction
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

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Query text could not be parsed
    ParseError,
    /// Plan references a collection the design does not materialize
    UnknownCollection,
    /// Query shape the planner cannot express
    UnsupportedQuery,
    /// Aggregate without grouping keys
    AggregateConfig,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::ParseError => "SHARDCOST_PARSE_ERROR",
            PlannerErrorCode::UnknownCollection => "SHARDCOST_UNKNOWN_COLLECTION",
            PlannerErrorCode::UnsupportedQuery => "SHARDCOST_UNSUPPORTED_QUERY",
            PlannerErrorCode::AggregateConfig => "SHARDCOST_AGGREGATE_CONFIG",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::AggregateConfig => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with context
#[derive(Debug, Clone)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Collection name if applicable
    collection: Option<String>,
}

impl PlannerError {
    /// Create an unknown collection error
    pub fn unknown_collection(collection: impl Into<String>) -> Self {
        let c = collection.into();
        Self {
            code: PlannerErrorCode::UnknownCollection,
            message: format!("Collection '{}' is not part of the active design", c),
            collection: Some(c),
        }
    }

    /// Create an unsupported query error
    pub fn unsupported_query(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::UnsupportedQuery,
            message: reason.into(),
            collection: None,
        }
    }

    /// Create an aggregate configuration error
    pub fn aggregate_config(operator: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::AggregateConfig,
            message: format!(
                "Aggregate operator '{}' requires at least one grouping key",
                operator.into()
            ),
            collection: None,
        }
    }

    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

impl From<ParseError> for PlannerError {
    fn from(err: ParseError) -> Self {
        let message = match err.offset() {
            Some(offset) => format!("{} (at offset {})", err.message(), offset),
            None => err.message().to_string(),
        };
        Self {
            code: PlannerErrorCode::ParseError,
            message,
            collection: None,
        }
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlannerErrorCode::UnknownCollection.code(),
            "SHARDCOST_UNKNOWN_COLLECTION"
        );
        assert_eq!(
            PlannerErrorCode::UnsupportedQuery.code(),
            "SHARDCOST_UNSUPPORTED_QUERY"
        );
        assert_eq!(
            PlannerErrorCode::AggregateConfig.code(),
            "SHARDCOST_AGGREGATE_CONFIG"
        );
    }

    #[test]
    fn test_severity() {
        assert_eq!(PlannerErrorCode::UnknownCollection.severity(), Severity::Reject);
        assert_eq!(PlannerErrorCode::AggregateConfig.severity(), Severity::Fatal);
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: PlannerError = ParseError::unexpected_token("FROM", "end of input", 9).into();
        assert_eq!(err.code(), PlannerErrorCode::ParseError);
        assert!(err.message().contains("offset 9"));
    }

    #[test]
    fn test_error_display() {
        let err = PlannerError::unknown_collection("Stock");
        let display = format!("{}", err);
        assert!(display.starts_with("[REJECT] SHARDCOST_UNKNOWN_COLLECTION"));
        assert!(display.contains("Stock"));
        assert_eq!(err.collection(), Some("Stock"));
    }
}
