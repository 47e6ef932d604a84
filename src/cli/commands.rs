//! CLI command implementations
//!
//! Commands load inputs, call into the library and print results to stdout.
//! Progress and rejections are logged to stderr.

use std::io::{self, Write};
use std::path::Path;

use crate::config::RunConfig;
use crate::cost::CostModel;
use crate::loader::Workload;
use crate::model::{DesignModels, QuerySpec};
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::planner::{ExplainPlan, QueryPlanner};
use crate::report::{summary_line, write_reports};
use crate::workload::{FailurePolicy, RunOutcome, WorkloadRunner};

use super::args::{Cli, Command, InputArgs};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run {
            inputs,
            out,
            config,
            fail_fast,
        } => evaluate(&inputs, &out, config.as_deref(), fail_fast),
        Command::Explain {
            inputs,
            design,
            query,
        } => explain(&inputs, &design, query.as_deref()),
    }
}

/// Evaluate all designs, print summaries and write reports under `out_dir`
pub fn evaluate(
    inputs: &InputArgs,
    out_dir: &Path,
    config_path: Option<&Path>,
    fail_fast: bool,
) -> CliResult<()> {
    let timer = Timer::new();

    let config = RunConfig::load_or_default(config_path)?;
    if let Some(path) = config_path {
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", path.display().to_string().as_str())],
        );
    }

    let workload = load_workload(inputs)?;
    let cost_model = CostModel::new(config.cost);
    let policy = if fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Continue
    };

    let outcome = WorkloadRunner::new(&workload, &cost_model)
        .with_policy(policy)
        .run()?;

    let stdout = io::stdout();
    print_outcome(&mut stdout.lock(), &outcome)?;

    let paths = write_reports(out_dir, &workload.queries, &outcome, &config.leaderboard)?;
    let plan_count = paths.plans.len().to_string();
    log_event_with_fields(
        Event::ReportWritten,
        &[
            ("out", out_dir.display().to_string().as_str()),
            ("plans", plan_count.as_str()),
        ],
    );

    let designs = outcome.designs.len().to_string();
    let failures = outcome.failure_count().to_string();
    let elapsed = timer.elapsed_ms();
    log_event_with_fields(
        Event::RunComplete,
        &[
            ("designs", designs.as_str()),
            ("elapsed_ms", elapsed.as_str()),
            ("failures", failures.as_str()),
        ],
    );

    Ok(())
}

/// Print explain plans of one design, for one query or all of them
pub fn explain(inputs: &InputArgs, design_id: &str, query_id: Option<&str>) -> CliResult<()> {
    let workload = load_workload(inputs)?;

    let design = workload
        .design(design_id)
        .ok_or_else(|| CliError::unknown_design(design_id))?;
    let models = DesignModels::build(&workload.schemas, &workload.stats, design)
        .map_err(|e| CliError::run_error(e.to_string()))?;

    let queries: Vec<&QuerySpec> = match query_id {
        Some(id) => vec![workload.query(id).ok_or_else(|| CliError::unknown_query(id))?],
        None => workload.queries.iter().collect(),
    };

    let planner = QueryPlanner::new(&models);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, query) in queries.iter().enumerate() {
        let explain = match planner.plan(query) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(e) => ExplainPlan::from_error(&query.id, &e),
        };
        if i > 0 {
            writeln!(out)?;
        }
        write!(out, "{}", explain)?;
    }
    out.flush()?;

    Ok(())
}

fn load_workload(inputs: &InputArgs) -> CliResult<Workload> {
    let workload = Workload::load(&inputs.paths())?;

    let designs = workload.designs.len().to_string();
    let queries = workload.queries.len().to_string();
    log_event_with_fields(
        Event::WorkloadLoaded,
        &[("designs", designs.as_str()), ("queries", queries.as_str())],
    );

    Ok(workload)
}

/// One header line per design followed by one line per query
fn print_outcome<W: Write>(out: &mut W, outcome: &RunOutcome) -> io::Result<()> {
    for design in &outcome.designs {
        writeln!(out, "Denormalization {}: {}", design.design_id, design.description)?;
        if let Some(e) = &design.model_error {
            writeln!(out, "  skipped -> {}", e)?;
            continue;
        }
        for result in &design.results {
            writeln!(out, "  {}", summary_line(result))?;
        }
        for failure in &design.failures {
            writeln!(out, "  {} -> rejected: {}", failure.query_id, failure.error)?;
        }
    }
    out.flush()
}
