//! Column-level facts about a relation gathered before discovery.
//!
//! The profile surfaces the same structural observations a cleaning pass would
//! log (constant columns, identical columns, single-column keys, duplicate
//! rows) without modifying the relation. Constant columns matter to discovery
//! because they are excluded from the lattice; duplicate rows matter to the
//! round-trip contract because a natural join reconstructs a set of rows.

use super::{Relation, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// A column holding a single distinct value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantAttribute {
    pub attribute: String,
    pub value: Value,
}

/// A column whose values are identical to an earlier column's, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateColumn {
    /// The first column with these values
    pub kept: String,
    /// A later column repeating them
    pub duplicate: String,
}

/// Structural summary of a relation instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationProfile {
    pub row_count: usize,
    pub attribute_count: usize,
    pub constant_attributes: Vec<ConstantAttribute>,
    pub duplicate_columns: Vec<DuplicateColumn>,
    /// Attributes whose values are all distinct
    pub unique_attributes: Vec<String>,
    /// Rows that repeat an earlier row exactly
    pub duplicate_rows: usize,
}

impl RelationProfile {
    /// Returns true if any column is constant.
    pub fn has_constants(&self) -> bool {
        !self.constant_attributes.is_empty()
    }
}

/// Profiles `relation`.
#[instrument(skip(relation), fields(rows = relation.row_count(), attributes = relation.width()))]
pub fn profile(relation: &Relation) -> RelationProfile {
    let schema = relation.schema();
    let rows = relation.row_count();

    let mut constant_attributes = Vec::new();
    let mut unique_attributes = Vec::new();
    for attribute in 0..relation.width() {
        let distinct: HashSet<&Value> = relation.column(attribute).collect();
        if rows > 0 && distinct.len() == 1 {
            constant_attributes.push(ConstantAttribute {
                attribute: schema.name(attribute).to_string(),
                value: relation.value(0, attribute).clone(),
            });
        }
        if rows > 0 && distinct.len() == rows {
            unique_attributes.push(schema.name(attribute).to_string());
        }
    }

    let mut duplicate_columns = Vec::new();
    let mut flagged: HashSet<usize> = HashSet::new();
    for first in 0..relation.width() {
        if flagged.contains(&first) {
            continue;
        }
        for second in first + 1..relation.width() {
            if flagged.contains(&second) {
                continue;
            }
            if relation.column(first).eq(relation.column(second)) {
                debug!(
                    kept = schema.name(first),
                    duplicate = schema.name(second),
                    "Identical columns"
                );
                flagged.insert(second);
                duplicate_columns.push(DuplicateColumn {
                    kept: schema.name(first).to_string(),
                    duplicate: schema.name(second).to_string(),
                });
            }
        }
    }

    let duplicate_rows = rows - relation.distinct_row_count();

    info!(
        constants = constant_attributes.len(),
        duplicate_columns = duplicate_columns.len(),
        unique = unique_attributes.len(),
        duplicate_rows,
        "Profiled relation"
    );

    RelationProfile {
        row_count: rows,
        attribute_count: relation.width(),
        constant_attributes,
        duplicate_columns,
        unique_attributes,
        duplicate_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_finds_structure() {
        let relation = Relation::new(
            ["id", "country", "code", "code_copy"],
            vec![
                vec![1.into(), "nl".into(), "a".into(), "a".into()],
                vec![2.into(), "nl".into(), "b".into(), "b".into()],
                vec![3.into(), "nl".into(), "a".into(), "a".into()],
                vec![3.into(), "nl".into(), "a".into(), "a".into()],
            ],
        )
        .unwrap();

        let profile = profile(&relation);
        assert_eq!(profile.row_count, 4);
        assert_eq!(
            profile.constant_attributes,
            vec![ConstantAttribute {
                attribute: "country".into(),
                value: Value::from("nl"),
            }]
        );
        assert_eq!(
            profile.duplicate_columns,
            vec![DuplicateColumn {
                kept: "code".into(),
                duplicate: "code_copy".into(),
            }]
        );
        assert!(profile.unique_attributes.is_empty());
        assert_eq!(profile.duplicate_rows, 1);
    }

    #[test]
    fn test_profile_of_empty_relation() {
        let relation = Relation::new(["a", "b"], vec![]).unwrap();
        let profile = profile(&relation);
        assert!(!profile.has_constants());
        assert!(profile.unique_attributes.is_empty());
        assert_eq!(profile.duplicate_rows, 0);
    }
}
