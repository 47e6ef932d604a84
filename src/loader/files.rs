//! Input file formats
//!
//! ```text
//! schema:  {collections: {name: {primary_key, fields: {name: {type | avg_size}}}}}
//! stats:   {cluster: {nb_servers, sharding_access_fraction},
//!           collections: {name: {nb_documents, distinct_values,
//!                                avg_array_lengths, field_selectivity}},
//!           query_frequencies: {id: freq}}
//! denorm:  {denormalizations: [{id, description,
//!                               collections: {name: {sharding_key, indexes}},
//!                               embeds: [{from, to, path, cardinality}]}]}
//! queries: {queries: [{id, sql, frequency?}]}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::errors::{LoaderError, LoaderResult};
use crate::model::{
    Cardinality, ClusterConfig, CollectionOverride, CollectionSchema, CollectionStats,
    DenormalizationSpec, EmbedSpec, FieldSpec, QuerySpec, DEFAULT_NB_SERVERS,
    DEFAULT_SHARDING_ACCESS_FRACTION,
};

/// Size of a field declared only by type
pub fn default_field_size(field_type: Option<&str>) -> u64 {
    match field_type {
        Some("integer") | Some("number") | Some("boolean") => 8,
        _ => 80,
    }
}

// ==================
// Schema file
// ==================

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaFile {
    #[serde(default)]
    collections: BTreeMap<String, SchemaEntry>,
}

#[derive(Debug, Deserialize)]
struct SchemaEntry {
    primary_key: String,
    #[serde(default)]
    fields: BTreeMap<String, FieldEntry>,
}

#[derive(Debug, Deserialize)]
struct FieldEntry {
    #[serde(default, rename = "type")]
    field_type: Option<String>,
    #[serde(default)]
    avg_size: Option<f64>,
}

impl SchemaFile {
    pub(crate) fn into_schemas(self) -> LoaderResult<BTreeMap<String, CollectionSchema>> {
        let mut schemas = BTreeMap::new();
        for (name, entry) in self.collections {
            let mut fields = Vec::with_capacity(entry.fields.len());
            for (field_name, field) in entry.fields {
                let size = match field.avg_size {
                    Some(size) if size.is_finite() && size >= 0.0 => size as u64,
                    Some(size) => {
                        return Err(LoaderError::invalid(
                            format!("field '{}.{}'", name, field_name),
                            format!("avg_size {} is not a non-negative number", size),
                        ))
                    }
                    None => default_field_size(field.field_type.as_deref()),
                };
                fields.push(FieldSpec::new(field_name, size));
            }
            let schema = CollectionSchema::new(name.clone(), entry.primary_key, fields);
            schemas.insert(name, schema);
        }
        Ok(schemas)
    }
}

// ==================
// Stats file
// ==================

#[derive(Debug, Deserialize)]
pub(crate) struct StatsFile {
    #[serde(default)]
    cluster: ClusterEntry,
    #[serde(default)]
    collections: BTreeMap<String, CollectionStats>,
    #[serde(default)]
    query_frequencies: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    #[serde(default = "default_nb_servers")]
    nb_servers: u64,
    #[serde(default = "default_access_fraction")]
    sharding_access_fraction: f64,
}

impl Default for ClusterEntry {
    fn default() -> Self {
        Self {
            nb_servers: default_nb_servers(),
            sharding_access_fraction: default_access_fraction(),
        }
    }
}

fn default_nb_servers() -> u64 {
    DEFAULT_NB_SERVERS
}

fn default_access_fraction() -> f64 {
    DEFAULT_SHARDING_ACCESS_FRACTION
}

/// Contents of a stats file after validation
pub(crate) struct LoadedStats {
    pub cluster: ClusterConfig,
    pub collections: BTreeMap<String, CollectionStats>,
    pub query_frequencies: BTreeMap<String, f64>,
}

impl StatsFile {
    pub(crate) fn validate(self) -> LoaderResult<LoadedStats> {
        let fraction = self.cluster.sharding_access_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(LoaderError::invalid(
                "cluster",
                format!("sharding_access_fraction {} is outside (0, 1]", fraction),
            ));
        }
        if self.cluster.nb_servers == 0 {
            return Err(LoaderError::invalid("cluster", "nb_servers must be positive"));
        }

        for (name, stats) in &self.collections {
            for (field, selectivity) in &stats.field_selectivity {
                if !(0.0..=1.0).contains(selectivity) {
                    return Err(LoaderError::invalid(
                        format!("stats of '{}'", name),
                        format!("selectivity of '{}' is {}, expected [0, 1]", field, selectivity),
                    ));
                }
            }
            for (path, length) in &stats.avg_array_lengths {
                if !length.is_finite() || *length < 0.0 {
                    return Err(LoaderError::invalid(
                        format!("stats of '{}'", name),
                        format!("average length of '{}' is {}", path, length),
                    ));
                }
            }
        }

        for (id, frequency) in &self.query_frequencies {
            check_frequency(id, *frequency)?;
        }

        Ok(LoadedStats {
            cluster: ClusterConfig::new(self.cluster.nb_servers).with_access_fraction(fraction),
            collections: self.collections,
            query_frequencies: self.query_frequencies,
        })
    }
}

fn check_frequency(query_id: &str, frequency: f64) -> LoaderResult<()> {
    if frequency.is_finite() && frequency >= 0.0 {
        Ok(())
    } else {
        Err(LoaderError::invalid(
            format!("frequency of query '{}'", query_id),
            format!("{} is not a non-negative number", frequency),
        ))
    }
}

// ==================
// Denormalization file
// ==================

#[derive(Debug, Deserialize)]
pub(crate) struct DenormFile {
    #[serde(default)]
    denormalizations: Vec<DesignEntry>,
}

#[derive(Debug, Deserialize)]
struct DesignEntry {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    collections: BTreeMap<String, OverrideEntry>,
    #[serde(default)]
    embeds: Vec<EmbedEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OverrideEntry {
    sharding_key: Option<String>,
    indexes: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedEntry {
    from: String,
    to: String,
    path: String,
    #[serde(default)]
    cardinality: Cardinality,
}

impl DenormFile {
    pub(crate) fn into_designs(self) -> LoaderResult<Vec<DenormalizationSpec>> {
        let mut seen = BTreeSet::new();
        let mut designs = Vec::with_capacity(self.denormalizations.len());
        for entry in self.denormalizations {
            if !seen.insert(entry.id.clone()) {
                return Err(LoaderError::DuplicateId {
                    kind: "denormalization",
                    id: entry.id,
                });
            }
            let mut design = DenormalizationSpec::new(entry.id).with_description(entry.description);
            for (name, o) in entry.collections {
                design = design.with_collection(
                    name,
                    CollectionOverride {
                        sharding_key: o.sharding_key.filter(|k| !k.is_empty()),
                        indexes: o.indexes,
                    },
                );
            }
            for embed in entry.embeds {
                design =
                    design.with_embed(EmbedSpec::new(embed.from, embed.to, embed.path, embed.cardinality));
            }
            designs.push(design);
        }
        Ok(designs)
    }
}

// ==================
// Query file
// ==================

#[derive(Debug, Deserialize)]
pub(crate) struct QueryFile {
    #[serde(default)]
    queries: Vec<QueryEntry>,
}

#[derive(Debug, Deserialize)]
struct QueryEntry {
    id: String,
    sql: String,
    #[serde(default)]
    frequency: Option<f64>,
}

impl QueryFile {
    /// Explicit frequency, else the stats file's, else 1
    pub(crate) fn into_queries(
        self,
        default_frequencies: &BTreeMap<String, f64>,
    ) -> LoaderResult<Vec<QuerySpec>> {
        let mut seen = BTreeSet::new();
        let mut queries = Vec::with_capacity(self.queries.len());
        for entry in self.queries {
            if !seen.insert(entry.id.clone()) {
                return Err(LoaderError::DuplicateId {
                    kind: "query",
                    id: entry.id,
                });
            }
            let frequency = entry
                .frequency
                .or_else(|| default_frequencies.get(&entry.id).copied())
                .unwrap_or(1.0);
            check_frequency(&entry.id, frequency)?;
            queries.push(QuerySpec::new(entry.id, entry.sql).with_frequency(frequency));
        }
        Ok(queries)
    }
}
