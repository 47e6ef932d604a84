//! CLI argument definitions using clap
//!
//! Commands:
//! - shardcost run --schema <path> --stats <path> --denorm <path> --queries <path>
//! - shardcost explain --schema <path> ... --design <id> [--query <id>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::loader::WorkloadPaths;

/// shardcost - cost estimation for denormalized, sharded document designs
#[derive(Parser, Debug)]
#[command(name = "shardcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The four workload input files
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Collection schemas
    #[arg(long, default_value = "schema.json")]
    pub schema: PathBuf,

    /// Collection statistics and cluster shape
    #[arg(long, default_value = "stats.json")]
    pub stats: PathBuf,

    /// Candidate denormalization designs
    #[arg(long, default_value = "denormalizations.json")]
    pub denorm: PathBuf,

    /// Workload queries
    #[arg(long, default_value = "queries.json")]
    pub queries: PathBuf,
}

impl InputArgs {
    pub fn paths(&self) -> WorkloadPaths {
        WorkloadPaths {
            schema: self.schema.clone(),
            stats: self.stats.clone(),
            denorm: self.denorm.clone(),
            queries: self.queries.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate every design against every query and write reports
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Path to run configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop at the first failing design or query
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print query plans for one design
    Explain {
        #[command(flatten)]
        inputs: InputArgs,

        /// Design id
        #[arg(long)]
        design: String,

        /// Only this query id
        #[arg(long)]
        query: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["shardcost", "run"]).unwrap();
        match cli.command {
            Command::Run {
                inputs,
                out,
                config,
                fail_fast,
            } => {
                assert_eq!(inputs.schema, PathBuf::from("schema.json"));
                assert_eq!(out, PathBuf::from("out"));
                assert!(config.is_none());
                assert!(!fail_fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_explain_requires_design() {
        assert!(Cli::try_parse_from(["shardcost", "explain"]).is_err());
        let cli =
            Cli::try_parse_from(["shardcost", "explain", "--design", "D2", "--query", "Q1"]).unwrap();
        match cli.command {
            Command::Explain { design, query, .. } => {
                assert_eq!(design, "D2");
                assert_eq!(query.as_deref(), Some("Q1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
