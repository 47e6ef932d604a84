//! Collection statistics, per-design collection configuration, cluster shape

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Fraction of shards touched by a lookup on the sharding key, unless configured
pub const DEFAULT_SHARDING_ACCESS_FRACTION: f64 = 0.1;

/// Server count used when the stats file does not declare one
pub const DEFAULT_NB_SERVERS: u64 = 1000;

/// Cardinality statistics for one collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of documents
    pub nb_documents: u64,
    /// Distinct value count per field path
    #[serde(default)]
    pub distinct_values: BTreeMap<String, u64>,
    /// Average array length per array path
    #[serde(default)]
    pub avg_array_lengths: BTreeMap<String, f64>,
    /// Explicit selectivity per field path, overriding distinct counts
    #[serde(default)]
    pub field_selectivity: BTreeMap<String, f64>,
}

impl CollectionStats {
    /// Create stats with a document count and no per-field data
    pub fn new(nb_documents: u64) -> Self {
        Self {
            nb_documents,
            ..Self::default()
        }
    }

    /// Adds a distinct value count
    pub fn with_distinct(mut self, field: impl Into<String>, distinct: u64) -> Self {
        self.distinct_values.insert(field.into(), distinct);
        self
    }

    /// Adds an average array length
    pub fn with_array_length(mut self, path: impl Into<String>, avg_len: f64) -> Self {
        self.avg_array_lengths.insert(path.into(), avg_len);
        self
    }

    /// Adds an explicit selectivity override
    pub fn with_selectivity(mut self, field: impl Into<String>, selectivity: f64) -> Self {
        self.field_selectivity.insert(field.into(), selectivity);
        self
    }

    /// Distinct count for a field, if known and non-zero
    pub fn distinct(&self, field: &str) -> Option<u64> {
        self.distinct_values.get(field).copied().filter(|d| *d > 0)
    }

    /// Equality selectivity of one field.
    ///
    /// Explicit override first, then 1/distinct, then 1.0.
    pub fn selectivity(&self, field: &str) -> f64 {
        if let Some(s) = self.field_selectivity.get(field) {
            return *s;
        }
        match self.distinct(field) {
            Some(d) => 1.0 / d as f64,
            None => 1.0,
        }
    }
}

/// Physical configuration of one collection within a design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Field that determines the shard of a document
    pub sharding_key: String,
    /// Secondary index fields
    #[serde(default)]
    pub indexes: BTreeSet<String>,
}

impl CollectionConfig {
    /// Config sharded on `sharding_key` with no secondary index
    pub fn new(sharding_key: impl Into<String>) -> Self {
        Self {
            sharding_key: sharding_key.into(),
            indexes: BTreeSet::new(),
        }
    }

    /// Adds secondary indexes
    pub fn with_indexes(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.indexes.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Checks if a field carries a secondary index
    pub fn is_indexed(&self, field: &str) -> bool {
        self.indexes.contains(field)
    }

    /// Checks if a field is the sharding key
    pub fn is_sharding_key(&self, field: &str) -> bool {
        self.sharding_key == field
    }
}

/// Shape of the cluster the workload runs on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Number of servers (shards)
    pub nb_servers: u64,
    /// Fraction of shards touched by a point lookup on the sharding key
    pub sharding_access_fraction: f64,
}

impl ClusterConfig {
    /// Cluster with the default sharding access fraction
    pub fn new(nb_servers: u64) -> Self {
        Self {
            nb_servers,
            sharding_access_fraction: DEFAULT_SHARDING_ACCESS_FRACTION,
        }
    }

    /// Overrides the sharding access fraction
    pub fn with_access_fraction(mut self, fraction: f64) -> Self {
        self.sharding_access_fraction = fraction;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NB_SERVERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectivity_override_wins() {
        let stats = CollectionStats::new(100)
            .with_distinct("brand", 50)
            .with_selectivity("brand", 0.3);
        assert_eq!(stats.selectivity("brand"), 0.3);
    }

    #[test]
    fn test_selectivity_from_distinct() {
        let stats = CollectionStats::new(100).with_distinct("brand", 50);
        assert_eq!(stats.selectivity("brand"), 0.02);
    }

    #[test]
    fn test_selectivity_unknown_is_one() {
        let stats = CollectionStats::new(100).with_distinct("zero", 0);
        assert_eq!(stats.selectivity("missing"), 1.0);
        assert_eq!(stats.selectivity("zero"), 1.0);
    }

    #[test]
    fn test_config_lookups() {
        let config = CollectionConfig::new("IDP").with_indexes(["brand"]);
        assert!(config.is_sharding_key("IDP"));
        assert!(config.is_indexed("brand"));
        assert!(!config.is_indexed("IDP"));
    }

    #[test]
    fn test_cluster_default_fraction() {
        let cluster = ClusterConfig::default();
        assert_eq!(cluster.nb_servers, 1000);
        assert_eq!(cluster.sharding_access_fraction, 0.1);
    }
}
