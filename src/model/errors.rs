//! Model error types
//!
//! Error codes:
//! - SHARDCOST_MISSING_SCHEMA (REJECT)
//! - SHARDCOST_MISSING_STATS (REJECT)
//!
//! Both abort building a whole design; they never affect other designs.

use std::fmt;

/// Severity levels for model errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The design is rejected, the run may continue
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Model-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorCode {
    /// A collection named by a design has no schema
    MissingSchema,
    /// A collection named by a design has no statistics
    MissingStats,
}

impl ModelErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ModelErrorCode::MissingSchema => "SHARDCOST_MISSING_SCHEMA",
            ModelErrorCode::MissingStats => "SHARDCOST_MISSING_STATS",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ModelErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while building the collection models of one design
#[derive(Debug, Clone)]
pub struct ModelError {
    code: ModelErrorCode,
    message: String,
    design_id: String,
    collection: String,
}

impl ModelError {
    /// A collection in the design has no schema
    pub fn missing_schema(design_id: impl Into<String>, collection: impl Into<String>) -> Self {
        let design_id = design_id.into();
        let collection = collection.into();
        Self {
            code: ModelErrorCode::MissingSchema,
            message: format!(
                "Design '{}' references collection '{}' which has no schema",
                design_id, collection
            ),
            design_id,
            collection,
        }
    }

    /// A collection in the design has no statistics
    pub fn missing_stats(design_id: impl Into<String>, collection: impl Into<String>) -> Self {
        let design_id = design_id.into();
        let collection = collection.into();
        Self {
            code: ModelErrorCode::MissingStats,
            message: format!(
                "Design '{}' references collection '{}' which has no statistics",
                design_id, collection
            ),
            design_id,
            collection,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ModelErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the design that failed to build
    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    /// Returns the offending collection
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for ModelError {
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

impl std::error::Error for ModelError {}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ModelErrorCode::MissingSchema.code(), "SHARDCOST_MISSING_SCHEMA");
        assert_eq!(ModelErrorCode::MissingStats.code(), "SHARDCOST_MISSING_STATS");
    }

    #[test]
    fn test_error_display() {
        let err = ModelError::missing_stats("D3", "Stock");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("SHARDCOST_MISSING_STATS"));
        assert!(display.contains("Stock"));
        assert_eq!(err.design_id(), "D3");
        assert_eq!(err.collection(), "Stock");
    }
}
