//! Third normal form synthesis and its validation.
//!
//! [`decompose`] runs Bernstein synthesis over a minimal cover:
//!
//! 1. One schema per distinct left-hand side X, holding X and everything X
//!    determines in the cover, keyed by X.
//! 2. Schemas whose attributes sit inside another schema are dropped.
//! 3. When no schema contains a candidate key, a schema of exactly the primary
//!    key is added. Attributes no dependency mentions land there.
//!
//! The result is then validated. A failed lossless-join chase is a fatal
//! [`TermError::DecompositionInvariantViolation`]; dependencies the schemas
//! fail to preserve are attached as [`DependencyPreservationWarning`]s.
//!
//! # Example
//!
//! ```rust
//! use term_normal::cover::minimal_cover;
//! use term_normal::decompose::decompose;
//! use term_normal::dependency::{FdSet, FunctionalDependency};
//! use term_normal::keys::candidate_keys;
//! use term_normal::relation::Schema;
//!
//! let schema = Schema::new(["student_id", "course_id", "course_name"]).unwrap();
//! let fds: FdSet = [FunctionalDependency::from_names(&schema, &["course_id"], "course_name").unwrap()]
//!     .into_iter()
//!     .collect();
//! let cover = minimal_cover(&fds, &schema);
//! let keys = candidate_keys(&schema, &cover);
//! let decomposition = decompose(&schema, &cover, &keys).unwrap();
//!
//! assert_eq!(decomposition.schemas.len(), 2);
//! assert_eq!(decomposition.schemas[0].name, "course_id");
//! assert_eq!(decomposition.schemas[1].name, "course_id_student_id");
//! assert_eq!(decomposition.foreign_keys.len(), 1);
//! ```

pub mod chase;
pub mod preservation;

use crate::dependency::{FdSet, FunctionalDependency};
use crate::keys::CandidateKeys;
use crate::prelude::*;
use crate::relation::{AttributeSet, Relation, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// One relation of a decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSchema {
    /// Key attribute names joined with `_`
    pub name: String,
    pub attributes: AttributeSet,
    pub key: AttributeSet,
    /// Cover dependencies whose attributes all lie in this schema
    pub local_fds: FdSet,
}

impl RelationSchema {
    /// Attribute names in schema order.
    pub fn attribute_names<'a>(&self, schema: &'a Schema) -> Vec<&'a str> {
        self.attributes.iter().map(|a| schema.name(a)).collect()
    }
}

/// `from` holds the key of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Index of the referencing schema
    pub from: usize,
    /// Index of the referenced schema
    pub to: usize,
    /// The referenced key
    pub attributes: AttributeSet,
}

/// A cover dependency that no combination of schema-local dependencies derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyPreservationWarning {
    pub dependency: FunctionalDependency,
    pub message: String,
}

/// A lossless-join 3NF decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub schemas: Vec<RelationSchema>,
    pub foreign_keys: Vec<ForeignKey>,
    pub warnings: Vec<DependencyPreservationWarning>,
}

impl Decomposition {
    pub fn is_dependency_preserving(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Attribute sets of every schema, in order.
    pub fn attribute_sets(&self) -> Vec<AttributeSet> {
        self.schemas
            .iter()
            .map(|schema| schema.attributes.clone())
            .collect()
    }

    /// Projects `relation` onto every schema.
    pub fn project_instance(&self, relation: &Relation) -> Result<Vec<Relation>> {
        self.schemas
            .iter()
            .map(|schema| relation.project(&schema.attributes))
            .collect()
    }

    /// Natural join of the projections of `relation`.
    ///
    /// Equals the distinct rows of `relation` whenever the instance satisfies
    /// the cover exactly.
    pub fn reconstruct(&self, relation: &Relation) -> Result<Relation> {
        let mut projections = self.project_instance(relation)?.into_iter();
        let first = projections
            .next()
            .ok_or_else(|| TermError::Internal("decomposition has no schemas".to_string()))?;
        projections.try_fold(first, |joined, next| joined.natural_join(&next))
    }
}

/// Synthesizes a 3NF decomposition of `schema` from a minimal cover and its keys.
#[instrument(skip_all, fields(attributes = schema.width(), dependencies = cover.len()))]
pub fn decompose(schema: &Schema, cover: &FdSet, keys: &CandidateKeys) -> Result<Decomposition> {
    let mut determined: HashMap<&AttributeSet, AttributeSet> = HashMap::new();
    for fd in cover {
        determined
            .entry(&fd.lhs)
            .or_insert_with(|| fd.lhs.clone())
            .insert(fd.rhs);
    }
    let mut groups: Vec<(AttributeSet, AttributeSet)> = determined
        .into_iter()
        .map(|(lhs, attributes)| (lhs.clone(), attributes))
        .collect();
    groups.sort_by(|a, b| schema.compare_sets(&a.0, &b.0));

    let mut kept: Vec<(AttributeSet, AttributeSet)> = Vec::new();
    for (index, (key, attributes)) in groups.iter().enumerate() {
        let subsumed = groups.iter().enumerate().any(|(other, (_, other_attributes))| {
            other != index
                && attributes.is_subset(other_attributes)
                && (attributes != other_attributes || other < index)
        });
        if subsumed {
            debug!(schema = %schema.display_set(attributes), "Dropping subsumed schema");
        } else {
            kept.push((key.clone(), attributes.clone()));
        }
    }

    if !kept.iter().any(|(_, attributes)| keys.contains_key(attributes)) {
        debug!(key = %schema.display_set(&keys.primary), "Adding primary key schema");
        kept.push((keys.primary.clone(), keys.primary.clone()));
    }

    let schemas: Vec<RelationSchema> = kept
        .into_iter()
        .map(|(key, attributes)| RelationSchema {
            name: schema.names(&key).join("_"),
            local_fds: cover.embedded_in(&attributes),
            attributes,
            key,
        })
        .collect();
    let attribute_sets: Vec<AttributeSet> =
        schemas.iter().map(|s| s.attributes.clone()).collect();

    let covered = attribute_sets
        .iter()
        .fold(AttributeSet::empty(), |acc, attributes| acc.union(attributes));
    if covered != schema.all() {
        return Err(TermError::DecompositionInvariantViolation(format!(
            "schemas do not cover attributes {}",
            schema.display_set(&schema.all().difference(&covered))
        )));
    }

    let outcome = chase::chase(schema.width(), &attribute_sets, cover);
    if !outcome.is_lossless() {
        return Err(TermError::DecompositionInvariantViolation(format!(
            "chase found no fully distinguished row after {} passes over {} schemas",
            outcome.passes,
            schemas.len()
        )));
    }

    let warnings: Vec<DependencyPreservationWarning> =
        preservation::unpreserved(&attribute_sets, cover)
            .into_iter()
            .map(|fd| {
                let message = format!(
                    "{} is not derivable from schema-local dependencies",
                    fd.display(schema)
                );
                warn!(dependency = %fd.display(schema), "Dependency not preserved");
                DependencyPreservationWarning {
                    dependency: fd.clone(),
                    message,
                }
            })
            .collect();

    let foreign_keys = infer_foreign_keys(&schemas);

    info!(
        schemas = schemas.len(),
        foreign_keys = foreign_keys.len(),
        warnings = warnings.len(),
        "Synthesized 3NF decomposition"
    );

    Ok(Decomposition {
        schemas,
        foreign_keys,
        warnings,
    })
}

fn infer_foreign_keys(schemas: &[RelationSchema]) -> Vec<ForeignKey> {
    let mut foreign_keys = Vec::new();
    for (from, referencing) in schemas.iter().enumerate() {
        for (to, referenced) in schemas.iter().enumerate() {
            if from != to
                && referenced.key.is_subset(&referencing.attributes)
                && referenced.key != referencing.key
            {
                foreign_keys.push(ForeignKey {
                    from,
                    to,
                    attributes: referenced.key.clone(),
                });
            }
        }
    }
    foreign_keys
}
