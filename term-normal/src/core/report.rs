//! Serializable summary of a normalization run.
//!
//! Every attribute set is rendered by name so the report reads on its own,
//! without the schema it was computed against.

use super::NormalizerConfig;
use crate::decompose::Decomposition;
use crate::dependency::{FdSet, FunctionalDependency};
use crate::discovery::{DiscoveryStats, DiscoveryStatus};
use crate::prelude::*;
use crate::relation::{RelationProfile, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// X → A with names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub lhs: Vec<String>,
    pub rhs: String,
    pub support: f64,
}

impl DependencyRecord {
    pub fn new(fd: &FunctionalDependency, schema: &Schema) -> Self {
        Self {
            lhs: schema.names(&fd.lhs),
            rhs: schema.name(fd.rhs).to_string(),
            support: fd.support,
        }
    }

    pub(crate) fn all(fds: &FdSet, schema: &Schema) -> Vec<Self> {
        fds.iter().map(|fd| Self::new(fd, schema)).collect()
    }
}

/// One decomposed relation with names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub name: String,
    /// In the column order of the input relation
    pub attributes: Vec<String>,
    pub key: Vec<String>,
    pub local_dependencies: Vec<DependencyRecord>,
}

/// A foreign key between two decomposed relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRecord {
    pub from: String,
    pub to: String,
    pub attributes: Vec<String>,
}

/// What one normalization run found, ready for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the input instance
    pub fingerprint: String,
    pub attributes: Vec<String>,
    pub row_count: usize,
    pub config: NormalizerConfig,
    pub profile: RelationProfile,
    pub status: DiscoveryStatus,
    pub stats: DiscoveryStats,
    pub constant_attributes: Vec<String>,
    pub discovered: Vec<DependencyRecord>,
    pub cover: Vec<DependencyRecord>,
    pub candidate_keys: Vec<Vec<String>>,
    pub primary_key: Vec<String>,
    pub schemas: Vec<SchemaRecord>,
    pub foreign_keys: Vec<ForeignKeyRecord>,
    /// Dependency preservation warnings
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
}

impl NormalizationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, DiscoveryStatus::Complete)
    }
}

pub(crate) fn schema_records(decomposition: &Decomposition, schema: &Schema) -> Vec<SchemaRecord> {
    decomposition
        .schemas
        .iter()
        .map(|relation| SchemaRecord {
            name: relation.name.clone(),
            attributes: relation
                .attribute_names(schema)
                .into_iter()
                .map(str::to_string)
                .collect(),
            key: schema.names(&relation.key),
            local_dependencies: DependencyRecord::all(&relation.local_fds, schema),
        })
        .collect()
}

pub(crate) fn foreign_key_records(
    decomposition: &Decomposition,
    schema: &Schema,
) -> Vec<ForeignKeyRecord> {
    decomposition
        .foreign_keys
        .iter()
        .map(|fk| ForeignKeyRecord {
            from: decomposition.schemas[fk.from].name.clone(),
            to: decomposition.schemas[fk.to].name.clone(),
            attributes: schema.names(&fk.attributes),
        })
        .collect()
}
