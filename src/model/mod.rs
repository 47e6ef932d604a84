//! Data model for cost estimation
//!
//! In-memory records for schemas, statistics, per-design configuration and
//! cluster shape. A [`DesignModels`] is built once per candidate design and is
//! read-only afterwards; a new design always yields new model instances.

mod collection;
mod design;
mod errors;
mod query;
mod schema;
mod stats;

pub use collection::{
    unknown_field_note, CollectionModel, FieldSize, DEFAULT_FIELD_SIZE_BYTES, KEY_OVERHEAD_BYTES,
};
pub use design::{Cardinality, CollectionOverride, DenormalizationSpec, DesignModels, EmbedSpec};
pub use errors::{ModelError, ModelErrorCode, ModelResult};
pub use query::QuerySpec;
pub use schema::{CollectionSchema, FieldSpec};
pub use stats::{
    ClusterConfig, CollectionConfig, CollectionStats, DEFAULT_NB_SERVERS,
    DEFAULT_SHARDING_ACCESS_FRACTION,
};
