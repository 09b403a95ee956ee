//! Relation instances: a schema plus rectangular rows of [`Value`]s.
//!
//! A [`Relation`] is built once per run from cleaned input and is read-only for
//! the rest of the pipeline. Besides holding the data it provides the relational
//! operations needed to check a decomposition against the instance it came from:
//! projection with duplicate elimination, natural join and set comparison.
//!
//! # Example
//!
//! ```rust
//! use term_normal::relation::{Relation, Value};
//!
//! let relation = Relation::new(
//!     ["course_id", "course_name"],
//!     vec![
//!         vec![Value::from("cs101"), Value::from("Databases")],
//!         vec![Value::from("cs102"), Value::from("Compilers")],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(relation.row_count(), 2);
//! assert_eq!(relation.width(), 2);
//! ```

mod attributes;
mod names;
mod profile;
mod value;

pub use attributes::{AttributeSet, Schema};
pub use names::standardize_name;
pub use profile::{profile, ConstantAttribute, DuplicateColumn, RelationProfile};
pub use value::Value;

use crate::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// A relation instance: an ordered schema and rows aligned to it.
#[derive(Debug, Clone)]
pub struct Relation {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Relation {
    /// Creates a relation, checking that every row matches the schema width.
    pub fn new<S: Into<String>>(
        attributes: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        Self::from_schema(Schema::new(attributes)?, rows)
    }

    /// Creates a relation over an already validated schema.
    pub fn from_schema(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != schema.width())
        {
            return Err(TermError::input_shape(format!(
                "row {index} has {} values but the schema has {} attributes",
                row.len(),
                schema.width()
            )));
        }
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of attributes.
    pub fn width(&self) -> usize {
        self.schema.width()
    }

    /// The cell at (`row`, `attribute`).
    pub fn value(&self, row: usize, attribute: usize) -> &Value {
        &self.rows[row][attribute]
    }

    /// Iterates the values of one attribute in row order.
    pub fn column(&self, attribute: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[attribute])
    }

    /// Number of distinct rows.
    pub fn distinct_row_count(&self) -> usize {
        self.rows.iter().collect::<HashSet<_>>().len()
    }

    /// Projects onto `attributes` (in schema order), dropping duplicate rows.
    pub fn project(&self, attributes: &AttributeSet) -> Result<Relation> {
        if let Some(out_of_range) = attributes.iter().find(|a| *a >= self.width()) {
            return Err(TermError::input_shape(format!(
                "cannot project onto attribute position {out_of_range}; schema has {} attributes",
                self.width()
            )));
        }

        let positions: Vec<usize> = attributes.iter().collect();
        let names: Vec<String> = positions
            .iter()
            .map(|&a| self.schema.name(a).to_string())
            .collect();

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for row in &self.rows {
            let projected: Vec<Value> = positions.iter().map(|&a| row[a].clone()).collect();
            if seen.insert(projected.clone()) {
                rows.push(projected);
            }
        }

        Relation::new(names, rows)
    }

    /// Natural join on all attributes with equal names.
    ///
    /// The output schema is this relation's attributes followed by the other
    /// relation's remaining attributes. Duplicate rows are removed. Relations
    /// without common attributes produce their cartesian product.
    pub fn natural_join(&self, other: &Relation) -> Result<Relation> {
        let common: Vec<(usize, usize)> = self
            .schema
            .attributes()
            .iter()
            .enumerate()
            .filter_map(|(i, name)| other.schema.position(name).ok().map(|j| (i, j)))
            .collect();
        let other_only: Vec<usize> = (0..other.width())
            .filter(|j| !common.iter().any(|(_, c)| c == j))
            .collect();

        let mut attributes = self.schema.attributes().to_vec();
        attributes.extend(other_only.iter().map(|&j| other.schema.name(j).to_string()));

        let mut buckets: HashMap<Vec<&Value>, Vec<usize>> = HashMap::new();
        for (index, row) in other.rows.iter().enumerate() {
            let key: Vec<&Value> = common.iter().map(|&(_, j)| &row[j]).collect();
            buckets.entry(key).or_default().push(index);
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for row in &self.rows {
            let key: Vec<&Value> = common.iter().map(|&(i, _)| &row[i]).collect();
            let Some(matches) = buckets.get(&key) else {
                continue;
            };
            for &index in matches {
                let mut joined = row.clone();
                joined.extend(other_only.iter().map(|&j| other.rows[index][j].clone()));
                if seen.insert(joined.clone()) {
                    rows.push(joined);
                }
            }
        }

        Relation::new(attributes, rows)
    }

    /// Set equality of rows, matching columns by name.
    ///
    /// Returns false when the two relations do not have the same attribute
    /// names. Row order and duplicates are ignored.
    pub fn same_rows_as(&self, other: &Relation) -> bool {
        if self.width() != other.width() {
            return false;
        }
        let Ok(mapping) = self
            .schema
            .attributes()
            .iter()
            .map(|name| other.schema.position(name))
            .collect::<Result<Vec<usize>>>()
        else {
            return false;
        };

        let mine: HashSet<&Vec<Value>> = self.rows.iter().collect();
        let theirs: HashSet<Vec<Value>> = other
            .rows
            .iter()
            .map(|row| mapping.iter().map(|&j| row[j].clone()).collect())
            .collect();

        mine.len() == theirs.len() && theirs.iter().all(|row| mine.contains(row))
    }

    /// SHA-256 over the schema and every cell, hex encoded.
    ///
    /// Two runs over the same instance report the same fingerprint, which lets
    /// a report be matched to the data it describes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in self.schema.attributes() {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
        }
        hasher.update([0x1e]);
        for row in &self.rows {
            for value in row {
                // length prefixed so separator bytes inside text cannot shift cells
                let text = value.to_string();
                hasher.update(value.type_name().as_bytes());
                hasher.update(b":");
                hasher.update((text.len() as u64).to_le_bytes());
                hasher.update(text.as_bytes());
            }
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }

    /// Renames every attribute with [`standardize_name`].
    ///
    /// Returns the renamed relation and the `(old, new)` pairs that changed.
    pub fn with_standardized_names(self) -> Result<(Relation, Vec<(String, String)>)> {
        let (names, renames) = names::standardize_names(self.schema.attributes());
        if !renames.is_empty() {
            tracing::info!(renamed = renames.len(), "Standardized attribute names");
        }
        let relation = Relation::from_schema(Schema::new(names)?, self.rows)?;
        Ok((relation, renames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| row.iter().map(|v| Value::from(*v)).collect())
            .collect()
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = Relation::new(["a", "b"], text_rows(&[&["1", "2"], &["3"]]));
        match result {
            Err(TermError::InputShape { message }) => assert!(message.contains("row 1")),
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_project_drops_duplicates() {
        let relation = Relation::new(
            ["a", "b", "c"],
            text_rows(&[&["1", "x", "p"], &["1", "x", "q"], &["2", "y", "p"]]),
        )
        .unwrap();
        let projected = relation
            .project(&relation.schema().attribute_set(&["a", "b"]).unwrap())
            .unwrap();
        assert_eq!(projected.row_count(), 2);
        assert_eq!(projected.schema().attributes(), &["a", "b"]);
    }

    #[test]
    fn test_natural_join_on_common_attribute() {
        let left = Relation::new(["s", "c"], text_rows(&[&["s1", "c1"], &["s2", "c1"]])).unwrap();
        let right = Relation::new(["c", "n"], text_rows(&[&["c1", "DB"], &["c2", "OS"]])).unwrap();

        let joined = left.natural_join(&right).unwrap();
        assert_eq!(joined.schema().attributes(), &["s", "c", "n"]);
        assert_eq!(joined.row_count(), 2);
    }

    #[test]
    fn test_natural_join_without_common_is_product() {
        let left = Relation::new(["a"], text_rows(&[&["1"], &["2"]])).unwrap();
        let right = Relation::new(["b"], text_rows(&[&["x"], &["y"], &["z"]])).unwrap();
        assert_eq!(left.natural_join(&right).unwrap().row_count(), 6);
    }

    #[test]
    fn test_same_rows_ignores_column_order() {
        let a = Relation::new(["x", "y"], text_rows(&[&["1", "2"], &["3", "4"]])).unwrap();
        let b = Relation::new(["y", "x"], text_rows(&[&["4", "3"], &["2", "1"]])).unwrap();
        let c = Relation::new(["y", "x"], text_rows(&[&["4", "3"]])).unwrap();
        assert!(a.same_rows_as(&b));
        assert!(!a.same_rows_as(&c));
    }

    #[test]
    fn test_fingerprint_is_stable_and_type_aware() {
        let a = Relation::new(["x"], vec![vec![Value::Int(1)]]).unwrap();
        let b = Relation::new(["x"], vec![vec![Value::Int(1)]]).unwrap();
        let c = Relation::new(["x"], vec![vec![Value::from("1")]]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_separators_inside_text() {
        let a = Relation::new(
            ["a", "b"],
            vec![vec![Value::from("p\u{1f}text:q"), Value::from("r")]],
        )
        .unwrap();
        let b = Relation::new(
            ["a", "b"],
            vec![vec![Value::from("p"), Value::from("q\u{1f}text:r")]],
        )
        .unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());

        let joined = Relation::new(["a\u{1f}b"], vec![]).unwrap();
        let split = Relation::new(["a", "b"], vec![]).unwrap();
        assert_ne!(joined.fingerprint(), split.fingerprint());
    }

    #[test]
    fn test_with_standardized_names() {
        let relation =
            Relation::new(["Course ID", "course-id", "Name"], text_rows(&[&["1", "1", "a"]]))
                .unwrap();
        let (renamed, renames) = relation.with_standardized_names().unwrap();
        assert_eq!(
            renamed.schema().attributes(),
            &["course_id", "courseid", "name"]
        );
        assert_eq!(renames.len(), 3);
    }
}
