//! CollectionModel: the (schema, stats, config) unit the simulator sizes

use super::schema::CollectionSchema;
use super::stats::{CollectionConfig, CollectionStats};

/// Size assumed for a field path the schema does not declare
pub const DEFAULT_FIELD_SIZE_BYTES: u64 = 8;

/// Per-field key overhead in an output document
pub const KEY_OVERHEAD_BYTES: u64 = 12;

/// Result of sizing one field path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSize {
    /// Declared in the schema
    Known(u64),
    /// Not declared; the default size applies
    Defaulted(u64),
}

impl FieldSize {
    /// Size in bytes regardless of origin
    pub fn bytes(&self) -> u64 {
        match self {
            FieldSize::Known(b) | FieldSize::Defaulted(b) => *b,
        }
    }

    /// Returns true if the default size was used
    pub fn is_defaulted(&self) -> bool {
        matches!(self, FieldSize::Defaulted(_))
    }
}

/// Immutable model of one collection inside one design
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionModel {
    schema: CollectionSchema,
    stats: CollectionStats,
    config: CollectionConfig,
}

impl CollectionModel {
    /// Builds a model; the triple cannot change afterwards
    pub fn new(schema: CollectionSchema, stats: CollectionStats, config: CollectionConfig) -> Self {
        Self {
            schema,
            stats,
            config,
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Number of documents in the collection
    pub fn nb_documents(&self) -> u64 {
        self.stats.nb_documents
    }

    /// Average size in bytes of a whole document
    pub fn document_size_bytes(&self) -> u64 {
        self.schema.document_size_bytes(&self.stats.avg_array_lengths)
    }

    /// Size of one field path, falling back to the default size on a miss
    pub fn field_size(&self, field_path: &str) -> FieldSize {
        match self
            .schema
            .field_size_bytes(field_path, &self.stats.avg_array_lengths)
        {
            Some(bytes) => FieldSize::Known(bytes),
            None => FieldSize::Defaulted(DEFAULT_FIELD_SIZE_BYTES),
        }
    }

    /// Equality selectivity of a field, see [`CollectionStats::selectivity`]
    pub fn selectivity(&self, field: &str) -> f64 {
        self.stats.selectivity(field)
    }

    /// Size of an output document projecting `fields`.
    ///
    /// Each field costs the key overhead plus its effective size. An empty
    /// projection means the whole document. Defaulted fields append a note.
    pub fn output_document_size(&self, fields: &[String], notes: &mut Vec<String>) -> u64 {
        if fields.is_empty() {
            return self.document_size_bytes();
        }
        fields
            .iter()
            .map(|field| {
                let size = self.field_size(field);
                if size.is_defaulted() {
                    notes.push(unknown_field_note(self.name(), field));
                }
                KEY_OVERHEAD_BYTES + size.bytes()
            })
            .sum()
    }
}

/// Note recorded when a field falls back to the default size
pub fn unknown_field_note(collection: &str, field: &str) -> String {
    format!(
        "Unknown field '{}' on '{}', assumed {} bytes",
        field, collection, DEFAULT_FIELD_SIZE_BYTES
    )
}
