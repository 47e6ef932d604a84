//! CLI-specific error types
//!
//! All CLI errors are fatal to the process

use std::fmt;
use std::io;

use crate::loader::LoaderError;
use crate::report::ReportError;
use crate::workload::WorkloadError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, report files)
    IoError,
    /// Input files could not be loaded
    LoadError,
    /// Run aborted under --fail-fast
    RunError,
    /// No design with the requested id
    UnknownDesign,
    /// No query with the requested id
    UnknownQuery,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SHARDCOST_CLI_CONFIG_ERROR",
            Self::IoError => "SHARDCOST_CLI_IO_ERROR",
            Self::LoadError => "SHARDCOST_CLI_LOAD_ERROR",
            Self::RunError => "SHARDCOST_CLI_RUN_ERROR",
            Self::UnknownDesign => "SHARDCOST_CLI_UNKNOWN_DESIGN",
            Self::UnknownQuery => "SHARDCOST_CLI_UNKNOWN_QUERY",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn load_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LoadError, msg)
    }

    pub fn run_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RunError, msg)
    }

    pub fn unknown_design(design_id: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownDesign,
            format!("No denormalization with id '{}'", design_id),
        )
    }

    pub fn unknown_query(query_id: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownQuery,
            format!("No query with id '{}'", query_id),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<LoaderError> for CliError {
    fn from(e: LoaderError) -> Self {
        Self::load_error(e.to_string())
    }
}

impl From<WorkloadError> for CliError {
    fn from(e: WorkloadError) -> Self {
        Self::run_error(e.to_string())
    }
}

impl From<ReportError> for CliError {
    fn from(e: ReportError) -> Self {
        Self::io_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::unknown_design("D9");
        assert_eq!(
            err.to_string(),
            "SHARDCOST_CLI_UNKNOWN_DESIGN: No denormalization with id 'D9'"
        );
    }

    #[test]
    fn test_loader_error_maps_to_load_error() {
        let err: CliError = LoaderError::invalid("cluster", "nb_servers must be positive").into();
        assert_eq!(err.code(), &CliErrorCode::LoadError);
        assert!(err.message().contains("nb_servers"));
    }
}
