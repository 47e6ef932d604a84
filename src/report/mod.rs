//! Reporting
//!
//! Turns a [`crate::workload::RunOutcome`] into plan JSON documents, a flat
//! CSV table, a Markdown leaderboard and one-line summaries.

mod errors;
mod leaderboard;
mod plan;
mod rows;
mod writer;

pub use errors::{ReportError, ReportResult};
pub use leaderboard::{leaderboard_markdown, LeaderboardWeights};
pub use plan::{
    plan_documents, plan_file_stub, DesignPlanDocument, FilterDocument, JoinDocument,
    OperatorDocument, PlanDocument,
};
pub use rows::{summary_line, write_csv, ResultRow, CSV_HEADER};
pub use writer::{write_reports, ReportPaths};
