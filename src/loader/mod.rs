//! Workload loader
//!
//! Reads the schema, statistics, denormalization and query JSON files into
//! the in-memory model. File-level problems (unreadable file, malformed JSON,
//! out-of-range values, duplicate ids) are reported with the offending path.

mod errors;
mod files;
mod loader;

pub use errors::{LoaderError, LoaderResult};
pub use files::default_field_size;
pub use loader::{Workload, WorkloadPaths};
