//! Workload loader reading the four input files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::errors::{LoaderError, LoaderResult};
use super::files::{DenormFile, QueryFile, SchemaFile, StatsFile};
use crate::model::{
    ClusterConfig, CollectionSchema, CollectionStats, DenormalizationSpec, QuerySpec,
};

/// Locations of the input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadPaths {
    pub schema: PathBuf,
    pub stats: PathBuf,
    pub denorm: PathBuf,
    pub queries: PathBuf,
}

/// Everything needed to evaluate designs
#[derive(Debug, Clone)]
pub struct Workload {
    pub schemas: BTreeMap<String, CollectionSchema>,
    pub stats: BTreeMap<String, CollectionStats>,
    pub cluster: ClusterConfig,
    /// Candidate designs in file order
    pub designs: Vec<DenormalizationSpec>,
    /// Queries in file order
    pub queries: Vec<QuerySpec>,
}

impl Workload {
    /// Loads and validates all four files
    pub fn load(paths: &WorkloadPaths) -> LoaderResult<Self> {
        let schemas = in_file(&paths.schema, |file: SchemaFile| file.into_schemas())?;
        let stats = in_file(&paths.stats, |file: StatsFile| file.validate())?;
        let designs = in_file(&paths.denorm, |file: DenormFile| file.into_designs())?;
        let queries = in_file(&paths.queries, |file: QueryFile| {
            file.into_queries(&stats.query_frequencies)
        })?;

        Ok(Self {
            schemas,
            stats: stats.collections,
            cluster: stats.cluster,
            designs,
            queries,
        })
    }

    pub fn design(&self, id: &str) -> Option<&DenormalizationSpec> {
        self.designs.iter().find(|d| d.id == id)
    }

    pub fn query(&self, id: &str) -> Option<&QuerySpec> {
        self.queries.iter().find(|q| q.id == id)
    }
}

/// Reads a JSON file and converts it, tagging any error with the path
fn in_file<F, T>(path: &Path, convert: impl FnOnce(F) -> LoaderResult<T>) -> LoaderResult<T>
where
    F: DeserializeOwned,
{
    read_json(path)
        .and_then(convert)
        .map_err(|e| LoaderError::in_file(path.display().to_string(), e))
}

fn read_json<F: DeserializeOwned>(path: &Path) -> LoaderResult<F> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
