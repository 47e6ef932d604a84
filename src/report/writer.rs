//! Output directory layout
//!
//! ```text
//! <out>/plans/<stub>.plan.json
//! <out>/results.csv
//! <out>/leaderboard.md
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::model::QuerySpec;
use crate::workload::RunOutcome;

use super::errors::{ReportError, ReportResult};
use super::leaderboard::{leaderboard_markdown, LeaderboardWeights};
use super::plan::{plan_documents, plan_file_stub};
use super::rows::{write_csv, ResultRow};

/// Paths of the files written by [`write_reports`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub plans: Vec<PathBuf>,
    pub results_csv: PathBuf,
    pub leaderboard: PathBuf,
}

/// Writes plan documents, the results table and the leaderboard under `out_dir`
pub fn write_reports(
    out_dir: &Path,
    queries: &[QuerySpec],
    outcome: &RunOutcome,
    weights: &LeaderboardWeights,
) -> ReportResult<ReportPaths> {
    let plans_dir = out_dir.join("plans");
    fs::create_dir_all(&plans_dir).map_err(|e| ReportError::io(&plans_dir, e))?;

    let mut plans = Vec::with_capacity(queries.len());
    for document in plan_documents(queries, outcome) {
        let path = plans_dir.join(format!("{}.plan.json", plan_file_stub(&document.query_id)));
        let json = serde_json::to_string_pretty(&document).map_err(|e| ReportError::Json {
            query_id: document.query_id.clone(),
            source: e,
        })?;
        fs::write(&path, json + "\n").map_err(|e| ReportError::io(&path, e))?;
        plans.push(path);
    }

    let results_csv = out_dir.join("results.csv");
    let rows: Vec<ResultRow> = outcome.results().map(ResultRow::from_result).collect();
    let file = File::create(&results_csv).map_err(|e| ReportError::io(&results_csv, e))?;
    write_csv(&rows, &mut BufWriter::new(file)).map_err(|e| ReportError::io(&results_csv, e))?;

    let leaderboard = out_dir.join("leaderboard.md");
    let markdown = leaderboard_markdown(&outcome.leaderboard(), weights);
    fs::write(&leaderboard, markdown + "\n").map_err(|e| ReportError::io(&leaderboard, e))?;

    Ok(ReportPaths {
        plans,
        results_csv,
        leaderboard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_outcome_writes_all_files() {
        let dir = TempDir::new().unwrap();
        let queries = vec![QuerySpec::new("Q1", "SELECT * FROM A")];
        let paths = write_reports(
            dir.path(),
            &queries,
            &RunOutcome::default(),
            &LeaderboardWeights::default(),
        )
        .unwrap();

        assert_eq!(paths.plans, vec![dir.path().join("plans").join("query1.plan.json")]);
        let plan: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.plans[0]).unwrap()).unwrap();
        assert_eq!(plan["query_id"], "Q1");
        assert!(plan["per_denorm"].as_object().unwrap().is_empty());

        let csv = fs::read_to_string(&paths.results_csv).unwrap();
        assert_eq!(csv.lines().count(), 1);
        let md = fs::read_to_string(&paths.leaderboard).unwrap();
        assert!(md.starts_with("# Denormalization Leaderboard"));
    }

    #[test]
    fn test_unwritable_directory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, "not a directory").unwrap();
        let err = write_reports(
            &blocker,
            &[],
            &RunOutcome::default(),
            &LeaderboardWeights::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
