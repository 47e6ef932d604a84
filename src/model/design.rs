//! Denormalization designs and the per-design model builder
//!
//! A design picks sharding keys and indexes per collection and lists embed
//! edges. Building a design produces fresh [`CollectionModel`]s; embedding a
//! source into a target yields a new target model with the source's fields
//! and statistics under the embed path. Nothing loaded is mutated.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::collection::CollectionModel;
use super::errors::{ModelError, ModelResult};
use super::schema::{CollectionSchema, FieldSpec};
use super::stats::{CollectionConfig, CollectionStats};

/// How many source documents sit in one target document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// A single nested object
    #[default]
    One,
    /// An array of nested objects
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "one",
            Cardinality::Many => "many",
        }
    }
}

/// A denormalization edge: `source` documents nested in `target` at `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSpec {
    pub source: String,
    pub target: String,
    /// Dotted path of the container inside the target
    pub path: String,
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl EmbedSpec {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        path: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            path: path.into(),
            cardinality,
        }
    }

    /// Prefixes a source field path with the embed path
    pub fn embedded_path(&self, field: &str) -> String {
        format!("{}.{}", self.path, field)
    }
}

/// Sharding/index override of one collection in a design
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionOverride {
    /// Sharding key; the primary key when absent
    #[serde(default)]
    pub sharding_key: Option<String>,
    #[serde(default)]
    pub indexes: BTreeSet<String>,
}

impl CollectionOverride {
    pub fn sharded_on(key: impl Into<String>) -> Self {
        Self {
            sharding_key: Some(key.into()),
            indexes: BTreeSet::new(),
        }
    }

    pub fn with_indexes(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.indexes.extend(fields.into_iter().map(Into::into));
        self
    }
}

/// One candidate physical design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenormalizationSpec {
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Collections materialized by this design
    pub collections: BTreeMap<String, CollectionOverride>,
    /// Embed edges, applied in order
    #[serde(default)]
    pub embeds: Vec<EmbedSpec>,
}

impl DenormalizationSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            collections: BTreeMap::new(),
            embeds: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_collection(mut self, name: impl Into<String>, config: CollectionOverride) -> Self {
        self.collections.insert(name.into(), config);
        self
    }

    pub fn with_embed(mut self, embed: EmbedSpec) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// The read-only collection models and active embeds of one built design
#[derive(Debug, Clone)]
pub struct DesignModels {
    design_id: String,
    collections: BTreeMap<String, CollectionModel>,
    embeds: Vec<EmbedSpec>,
}

impl DesignModels {
    /// Builds the models of `design` from the loaded schemas and statistics.
    ///
    /// Fails if any collection or embed source lacks a schema or statistics.
    /// Embeds whose target is not part of the design are ignored.
    pub fn build(
        schemas: &BTreeMap<String, CollectionSchema>,
        stats: &BTreeMap<String, CollectionStats>,
        design: &DenormalizationSpec,
    ) -> ModelResult<Self> {
        let mut collections = BTreeMap::new();

        for (name, override_config) in &design.collections {
            let schema = schemas
                .get(name)
                .ok_or_else(|| ModelError::missing_schema(&design.id, name))?;
            let collection_stats = stats
                .get(name)
                .ok_or_else(|| ModelError::missing_stats(&design.id, name))?;

            let sharding_key = override_config
                .sharding_key
                .clone()
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| schema.primary_key.clone());
            let config = CollectionConfig {
                sharding_key,
                indexes: override_config.indexes.clone(),
            };

            collections.insert(
                name.clone(),
                CollectionModel::new(schema.clone(), collection_stats.clone(), config),
            );
        }

        let mut active = Vec::new();
        for embed in &design.embeds {
            let Some(target) = collections.get(&embed.target) else {
                continue;
            };
            let source_schema = schemas
                .get(&embed.source)
                .ok_or_else(|| ModelError::missing_schema(&design.id, &embed.source))?;
            let source_stats = stats
                .get(&embed.source)
                .ok_or_else(|| ModelError::missing_stats(&design.id, &embed.source))?;

            let extended = CollectionModel::new(
                embed_schema(target.schema(), source_schema, embed),
                embed_stats(target.stats(), source_stats, embed),
                target.config().clone(),
            );
            collections.insert(embed.target.clone(), extended);
            active.push(embed.clone());
        }

        Ok(Self {
            design_id: design.id.clone(),
            collections,
            embeds: active,
        })
    }

    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    /// Collection name -> model
    pub fn collections(&self) -> &BTreeMap<String, CollectionModel> {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionModel> {
        self.collections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Active embeds in design order
    pub fn embeds(&self) -> &[EmbedSpec] {
        &self.embeds
    }

    /// The embed nesting `source` inside `target`, if active
    pub fn embed(&self, source: &str, target: &str) -> Option<&EmbedSpec> {
        self.embeds
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// The first active embed of `source` into a materialized collection
    pub fn embedding_of(&self, source: &str) -> Option<&EmbedSpec> {
        self.embeds
            .iter()
            .find(|e| e.source == source && self.contains(&e.target))
    }
}

fn embed_schema(
    target: &CollectionSchema,
    source: &CollectionSchema,
    embed: &EmbedSpec,
) -> CollectionSchema {
    let mut fields = target.fields.clone();
    for (name, spec) in &source.fields {
        let path = embed.embedded_path(name);
        let array_path = match embed.cardinality {
            Cardinality::Many => Some(embed.path.clone()),
            Cardinality::One => None,
        };
        fields.insert(
            path.clone(),
            FieldSpec {
                name: path,
                avg_size: spec.avg_size,
                array_path,
            },
        );
    }
    CollectionSchema {
        name: target.name.clone(),
        primary_key: target.primary_key.clone(),
        fields,
    }
}

fn embed_stats(
    target: &CollectionStats,
    source: &CollectionStats,
    embed: &EmbedSpec,
) -> CollectionStats {
    let mut stats = target.clone();
    for (field, distinct) in &source.distinct_values {
        stats
            .distinct_values
            .insert(embed.embedded_path(field), *distinct);
    }
    for (field, selectivity) in &source.field_selectivity {
        stats
            .field_selectivity
            .insert(embed.embedded_path(field), *selectivity);
    }
    stats
}
