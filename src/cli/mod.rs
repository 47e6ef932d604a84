//! CLI module for shardcost
//!
//! Provides command-line interface for:
//! - run: evaluate all designs and write reports
//! - explain: print query plans for one design

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, InputArgs};
pub use commands::{evaluate, explain, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
