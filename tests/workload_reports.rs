//! Workload and Report Tests
//!
//! End to end over files on disk:
//! - Loader reads and validates the four input files
//! - Runner evaluates every design against every query
//! - Reports land in the documented layout
//! - CLI commands succeed or fail with stable codes

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use shardcost::cli::{run_command, CliErrorCode, Command, InputArgs};
use shardcost::cost::{CostModel, CostRates};
use shardcost::loader::{Workload, WorkloadPaths};
use shardcost::report::{write_reports, LeaderboardWeights, CSV_HEADER};
use shardcost::workload::{FailurePolicy, WorkloadRunner};

// =============================================================================
// Helper Functions
// =============================================================================

fn write_json(dir: &Path, name: &str, value: Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

fn setup_inputs(dir: &Path) -> WorkloadPaths {
    let schema = write_json(
        dir,
        "schema.json",
        json!({"collections": {
            "Product": {"primary_key": "IDP", "fields": {
                "IDP": {"type": "integer"},
                "name": {"type": "string"},
                "brand": {"type": "string"},
                "price": {"type": "number"}
            }},
            "Stock": {"primary_key": "IDS", "fields": {
                "IDS": {"type": "integer"},
                "IDP": {"type": "integer"},
                "IDW": {"type": "integer"},
                "quantity": {"type": "integer"},
                "location": {"type": "string", "avg_size": 12}
            }}
        }}),
    );
    let stats = write_json(
        dir,
        "stats.json",
        json!({
            "cluster": {"nb_servers": 1000, "sharding_access_fraction": 0.1},
            "collections": {
                "Product": {
                    "nb_documents": 100000,
                    "distinct_values": {"brand": 5000},
                    "avg_array_lengths": {"stocks": 200}
                },
                "Stock": {
                    "nb_documents": 20000000,
                    "distinct_values": {"IDP": 100000, "IDW": 200}
                }
            },
            "query_frequencies": {"Q1": 100, "Q2": 10}
        }),
    );
    let denorm = write_json(
        dir,
        "denormalizations.json",
        json!({"denormalizations": [
            {
                "id": "D1",
                "description": "normalized, stock sharded by product",
                "collections": {
                    "Product": {"sharding_key": "IDP", "indexes": ["brand"]},
                    "Stock": {"sharding_key": "IDP"}
                }
            },
            {
                "id": "D2",
                "description": "normalized, default sharding",
                "collections": {"Product": {}, "Stock": {}}
            },
            {
                "id": "D3",
                "description": "stock embedded in product",
                "collections": {"Product": {"indexes": ["brand"]}},
                "embeds": [{"from": "Stock", "to": "Product", "path": "stocks", "cardinality": "many"}]
            }
        ]}),
    );
    let queries = write_json(
        dir,
        "queries.json",
        json!({"queries": [
            {"id": "Q1", "sql": "SELECT P.name, P.price FROM Product P WHERE P.brand = 'Apple'"},
            {"id": "Q2", "sql": "SELECT S.quantity, P.name FROM Stock S JOIN Product P ON S.IDP = P.IDP WHERE P.brand = 'Apple'"},
            {"id": "Q3", "sql": "SELECT IDW FROM Stock WHERE IDW = 7", "frequency": 2}
        ]}),
    );
    WorkloadPaths {
        schema,
        stats,
        denorm,
        queries,
    }
}

fn inputs(paths: &WorkloadPaths) -> InputArgs {
    InputArgs {
        schema: paths.schema.clone(),
        stats: paths.stats.clone(),
        denorm: paths.denorm.clone(),
        queries: paths.queries.clone(),
    }
}

// =============================================================================
// Loader Tests
// =============================================================================

#[test]
fn test_load_workload_from_files() {
    let tmp = TempDir::new().unwrap();
    let workload = Workload::load(&setup_inputs(tmp.path())).unwrap();

    assert_eq!(workload.schemas["Stock"].fields["location"].avg_size, 12);
    assert_eq!(workload.schemas["Product"].fields["name"].avg_size, 80);
    assert_eq!(workload.cluster.nb_servers, 1000);

    let ids: Vec<&str> = workload.designs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["D1", "D2", "D3"]);

    assert_eq!(workload.query("Q1").unwrap().frequency, 100.0);
    assert_eq!(workload.query("Q2").unwrap().frequency, 10.0);
    assert_eq!(workload.query("Q3").unwrap().frequency, 2.0);
}

#[test]
fn test_load_rejects_duplicate_query_ids() {
    let tmp = TempDir::new().unwrap();
    let mut paths = setup_inputs(tmp.path());
    paths.queries = write_json(
        tmp.path(),
        "dup.json",
        json!({"queries": [
            {"id": "Q1", "sql": "SELECT * FROM Product"},
            {"id": "Q1", "sql": "SELECT * FROM Stock"}
        ]}),
    );
    let err = Workload::load(&paths).unwrap_err();
    assert!(err.to_string().contains("dup.json"));
    assert!(err.to_string().contains("Duplicate query id 'Q1'"));
}

// =============================================================================
// Runner Tests
// =============================================================================

#[test]
fn test_run_and_rank_designs() {
    let tmp = TempDir::new().unwrap();
    let workload = Workload::load(&setup_inputs(tmp.path())).unwrap();
    let cost_model = CostModel::new(CostRates::default());
    let outcome = WorkloadRunner::new(&workload, &cost_model).run().unwrap();

    let d1 = outcome.design("D1").unwrap();
    let d2 = outcome.design("D2").unwrap();
    let d3 = outcome.design("D3").unwrap();
    assert!(d1.is_complete());
    assert!(d2.is_complete());

    // Stock only exists inside Product in D3
    assert_eq!(d3.results.len(), 3);
    assert_eq!(d3.result("Q2").unwrap().plan.join_count(), 0);

    // Co-sharded join never shuffles, default sharding does
    assert_eq!(d1.result("Q2").unwrap().shuffled_bytes, 0);
    assert!(d2.result("Q2").unwrap().shuffled_bytes > 0);

    let board = outcome.leaderboard();
    for pair in board.windows(2) {
        assert!(pair[0].price <= pair[1].price);
    }
    let position = |id: &str| board.iter().position(|t| t.design_id == id).unwrap();
    assert!(position("D1") < position("D2"));
}

#[test]
fn test_fail_fast_on_broken_design() {
    let tmp = TempDir::new().unwrap();
    let mut paths = setup_inputs(tmp.path());
    paths.denorm = write_json(
        tmp.path(),
        "broken.json",
        json!({"denormalizations": [
            {"id": "D1", "collections": {"Product": {}}},
            {"id": "D9", "collections": {"Warehouse": {}}}
        ]}),
    );
    let workload = Workload::load(&paths).unwrap();
    let cost_model = CostModel::new(CostRates::default());

    let outcome = WorkloadRunner::new(&workload, &cost_model).run().unwrap();
    let d9 = outcome.design("D9").unwrap();
    assert!(d9.model_error.is_some());
    assert!(outcome.leaderboard().iter().all(|t| t.design_id != "D9"));

    let err = WorkloadRunner::new(&workload, &cost_model)
        .with_policy(FailurePolicy::Abort)
        .run()
        .unwrap_err();
    assert_eq!(err.design_id(), "D1");
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_reports_layout() {
    let tmp = TempDir::new().unwrap();
    let workload = Workload::load(&setup_inputs(tmp.path())).unwrap();
    let cost_model = CostModel::new(CostRates::default());
    let outcome = WorkloadRunner::new(&workload, &cost_model).run().unwrap();

    let out = tmp.path().join("out");
    let paths = write_reports(
        &out,
        &workload.queries,
        &outcome,
        &LeaderboardWeights::default(),
    )
    .unwrap();

    assert_eq!(paths.plans.len(), 3);
    assert!(out.join("plans").join("query2.plan.json").exists());

    let plan: Value =
        serde_json::from_str(&fs::read_to_string(out.join("plans/query2.plan.json")).unwrap())
            .unwrap();
    assert_eq!(plan["query_id"], "Q2");
    let d1 = &plan["per_denorm"]["D1"];
    assert_eq!(d1["required_indexes"]["Product"], json!(["brand"]));
    let operators = d1["operators"].as_array().unwrap();
    assert_eq!(operators.last().unwrap()["type"], "nested_loop_with_sharding");
    assert_eq!(plan["per_denorm"]["D3"]["operators"].as_array().unwrap().len(), 1);

    let csv = fs::read_to_string(&paths.results_csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
    assert_eq!(lines.count(), 9);

    let md = fs::read_to_string(&paths.leaderboard).unwrap();
    assert!(md.contains("| Rank | Denorm | Time | Carbon | Price | Weighted |"));
    assert!(md.contains("| 1 |"));
}

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_run_writes_reports() {
    let tmp = TempDir::new().unwrap();
    let paths = setup_inputs(tmp.path());
    let out = tmp.path().join("reports");

    run_command(Command::Run {
        inputs: inputs(&paths),
        out: out.clone(),
        config: None,
        fail_fast: false,
    })
    .unwrap();

    assert!(out.join("results.csv").exists());
    assert!(out.join("leaderboard.md").exists());
    assert!(out.join("plans/query1.plan.json").exists());
}

#[test]
fn test_cli_run_with_bad_config() {
    let tmp = TempDir::new().unwrap();
    let paths = setup_inputs(tmp.path());
    let config = write_json(tmp.path(), "run.json", json!({"cost": {"time_per_gb": -1}}));

    let err = run_command(Command::Run {
        inputs: inputs(&paths),
        out: tmp.path().join("reports"),
        config: Some(config),
        fail_fast: false,
    })
    .unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

#[test]
fn test_cli_explain_unknown_design() {
    let tmp = TempDir::new().unwrap();
    let paths = setup_inputs(tmp.path());

    let err = run_command(Command::Explain {
        inputs: inputs(&paths),
        design: "D42".to_string(),
        query: None,
    })
    .unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::UnknownDesign);

    run_command(Command::Explain {
        inputs: inputs(&paths),
        design: "D3".to_string(),
        query: Some("Q2".to_string()),
    })
    .unwrap();
}
