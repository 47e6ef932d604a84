//! Workload error types
//!
//! Error codes:
//! - SHARDCOST_RUN_ABORTED (FATAL)
//!
//! Per-pair failures are carried as [`EvaluationError`] and only become a
//! [`WorkloadError`] under the abort policy.

use std::fmt;

use crate::model::ModelError;
use crate::planner::PlannerError;
use crate::simulator::SimulationError;

/// Failure of one design build or one (design, query) evaluation
#[derive(Debug, Clone)]
pub enum EvaluationError {
    Model(ModelError),
    Planner(PlannerError),
    Simulation(SimulationError),
}

impl EvaluationError {
    /// Stable code of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            EvaluationError::Model(e) => e.code().code(),
            EvaluationError::Planner(e) => e.code().code(),
            EvaluationError::Simulation(e) => e.code().code(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            EvaluationError::Model(e) => e.message(),
            EvaluationError::Planner(e) => e.message(),
            EvaluationError::Simulation(e) => e.message(),
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::Model(e) => write!(f, "{}", e),
            EvaluationError::Planner(e) => write!(f, "{}", e),
            EvaluationError::Simulation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationError::Model(e) => Some(e),
            EvaluationError::Planner(e) => Some(e),
            EvaluationError::Simulation(e) => Some(e),
        }
    }
}

impl From<ModelError> for EvaluationError {
    fn from(e: ModelError) -> Self {
        EvaluationError::Model(e)
    }
}

impl From<PlannerError> for EvaluationError {
    fn from(e: PlannerError) -> Self {
        EvaluationError::Planner(e)
    }
}

impl From<SimulationError> for EvaluationError {
    fn from(e: SimulationError) -> Self {
        EvaluationError::Simulation(e)
    }
}

/// Severity levels for workload errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run stops
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadErrorCode {
    /// A failure under the abort policy stopped the run
    Aborted,
}

impl WorkloadErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            WorkloadErrorCode::Aborted => "SHARDCOST_RUN_ABORTED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for WorkloadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error that stops a whole workload run
#[derive(Debug, Clone)]
pub struct WorkloadError {
    code: WorkloadErrorCode,
    message: String,
    design_id: String,
    query_id: Option<String>,
    cause: EvaluationError,
}

impl WorkloadError {
    /// Run stopped at `design_id` (and `query_id` when a query failed)
    pub fn aborted(
        design_id: impl Into<String>,
        query_id: Option<String>,
        cause: EvaluationError,
    ) -> Self {
        let design_id = design_id.into();
        let message = match &query_id {
            Some(query_id) => format!(
                "Run aborted at design '{}', query '{}': {}",
                design_id, query_id, cause
            ),
            None => format!("Run aborted at design '{}': {}", design_id, cause),
        };
        Self {
            code: WorkloadErrorCode::Aborted,
            message,
            design_id,
            query_id,
            cause,
        }
    }

    pub fn code(&self) -> WorkloadErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    /// The evaluation failure that triggered the abort
    pub fn cause(&self) -> &EvaluationError {
        &self.cause
    }
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

pub type WorkloadResult<T> = Result<T, WorkloadError>;
