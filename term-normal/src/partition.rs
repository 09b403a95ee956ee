//! Stripped partitions and the dependency test built on them.
//!
//! A stripped partition of an attribute set X groups row indices by their
//! values on X and drops the singleton groups: a row that is unique on X can
//! never witness a violation of X → A. Partitions are refined one attribute at
//! a time, so the cost of moving from X to X ∪ {A} is linear in the rows that
//! still sit in non-singleton classes, not in the size of the relation.
//!
//! # Example
//!
//! ```rust
//! use term_normal::partition::{ErrorMeasure, PartitionEngine};
//! use term_normal::relation::{AttributeSet, Relation, Value};
//!
//! let relation = Relation::new(
//!     ["course", "instructor"],
//!     vec![
//!         vec![Value::from("cs101"), Value::from("codd")],
//!         vec![Value::from("cs101"), Value::from("codd")],
//!         vec![Value::from("cs102"), Value::from("date")],
//!     ],
//! )
//! .unwrap();
//!
//! let engine = PartitionEngine::new(&relation);
//! let by_course = engine.partition(&AttributeSet::singleton(0));
//! assert_eq!(by_course.class_count(), 1);
//!
//! // course -> instructor holds exactly
//! assert_eq!(engine.dependency_error(&by_course, 1, ErrorMeasure::RowRatio), 0);
//! ```

use crate::relation::{AttributeSet, Relation, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// How violating rows of an approximate dependency are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMeasure {
    /// Every row of an X-class that splits on A counts as an error row.
    #[default]
    RowRatio,
    /// The minimum number of rows to delete for X → A to hold exactly
    /// (per X-class: its size minus its largest A-subclass).
    G3,
}

/// Equivalence classes of row indices under an attribute set, without singletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedPartition {
    classes: Vec<Vec<u32>>,
    row_count: usize,
}

impl StrippedPartition {
    fn new(mut classes: Vec<Vec<u32>>, row_count: usize) -> Self {
        classes.retain(|class| class.len() > 1);
        Self { classes, row_count }
    }

    pub fn classes(&self) -> &[Vec<u32>] {
        &self.classes
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Rows of the relation this partition was computed over.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows that sit in a non-singleton class.
    pub fn covered_rows(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// True when every row is unique on the attribute set, i.e. it is a key.
    pub fn is_unique(&self) -> bool {
        self.classes.is_empty()
    }

    /// Error rows of X → A given this partition as π(X) and `refined` as
    /// π(X ∪ {A}).
    ///
    /// This is the two-partition form of the dependency test. Discovery uses
    /// [`PartitionEngine::dependency_error`], which computes the same number
    /// without materializing π(X ∪ {A}).
    pub fn refinement_error(&self, refined: &StrippedPartition, measure: ErrorMeasure) -> usize {
        const SINGLETON: u32 = u32::MAX;
        let mut class_of = vec![SINGLETON; self.row_count];
        for (id, class) in refined.classes.iter().enumerate() {
            for &row in class {
                class_of[row as usize] = id as u32;
            }
        }

        let mut error = 0;
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for class in &self.classes {
            match measure {
                ErrorMeasure::RowRatio => {
                    let first = class_of[class[0] as usize];
                    let intact = first != SINGLETON
                        && class.iter().all(|&row| class_of[row as usize] == first);
                    if !intact {
                        error += class.len();
                    }
                }
                ErrorMeasure::G3 => {
                    counts.clear();
                    let mut largest = 1;
                    for &row in class {
                        let id = class_of[row as usize];
                        if id != SINGLETON {
                            let count = counts.entry(id).or_insert(0);
                            *count += 1;
                            largest = largest.max(*count);
                        }
                    }
                    error += class.len() - largest;
                }
            }
        }
        error
    }
}

/// Computes partitions over one relation instance.
///
/// Every column is dictionary-encoded once on construction so refinement
/// compares integer codes. The engine is shared by reference across discovery
/// workers; its work counter is the only mutable state and is atomic.
#[derive(Debug)]
pub struct PartitionEngine {
    codes: Vec<Vec<u32>>,
    cardinalities: Vec<usize>,
    row_count: usize,
    work: AtomicU64,
}

impl PartitionEngine {
    /// Encodes every column of `relation`.
    pub fn new(relation: &Relation) -> Self {
        let mut codes = Vec::with_capacity(relation.width());
        let mut cardinalities = Vec::with_capacity(relation.width());

        for attribute in 0..relation.width() {
            let mut dictionary: HashMap<&Value, u32> = HashMap::new();
            let column: Vec<u32> = relation
                .column(attribute)
                .map(|value| {
                    let next = dictionary.len() as u32;
                    *dictionary.entry(value).or_insert(next)
                })
                .collect();
            cardinalities.push(dictionary.len());
            codes.push(column);
        }

        Self {
            codes,
            cardinalities,
            row_count: relation.row_count(),
            work: AtomicU64::new(0),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn width(&self) -> usize {
        self.codes.len()
    }

    /// Number of distinct values of an attribute.
    pub fn cardinality(&self, attribute: usize) -> usize {
        self.cardinalities[attribute]
    }

    /// True when the attribute has exactly one distinct value.
    pub fn is_constant(&self, attribute: usize) -> bool {
        self.row_count > 0 && self.cardinalities[attribute] == 1
    }

    /// Cumulative rows touched by refinements and dependency tests.
    pub fn work_done(&self) -> u64 {
        self.work.load(Ordering::Relaxed)
    }

    /// π(∅): one class holding every row (stripped away for fewer than two rows).
    pub fn empty_partition(&self) -> StrippedPartition {
        StrippedPartition::new(vec![(0..self.row_count as u32).collect()], self.row_count)
    }

    /// π(X), built by refining π(∅) one attribute at a time.
    pub fn partition(&self, attributes: &AttributeSet) -> StrippedPartition {
        attributes
            .iter()
            .fold(self.empty_partition(), |partition, attribute| {
                self.refine(&partition, attribute)
            })
    }

    /// π(X ∪ {attribute}) from π(X): splits every class by the attribute's codes.
    pub fn refine(&self, parent: &StrippedPartition, attribute: usize) -> StrippedPartition {
        let column = &self.codes[attribute];
        let mut classes = Vec::new();
        let mut groups: HashMap<u32, Vec<u32>> = HashMap::new();

        for class in &parent.classes {
            groups.clear();
            for &row in class {
                groups.entry(column[row as usize]).or_default().push(row);
            }
            let mut split: Vec<Vec<u32>> = groups
                .drain()
                .map(|(_, rows)| rows)
                .filter(|rows| rows.len() > 1)
                .collect();
            // keep class order independent of hash iteration
            split.sort_unstable_by_key(|rows| rows[0]);
            classes.extend(split);
        }

        self.work
            .fetch_add(parent.covered_rows() as u64, Ordering::Relaxed);
        StrippedPartition {
            classes,
            row_count: parent.row_count,
        }
    }

    /// Error rows of X → `attribute` given π(X).
    pub fn dependency_error(
        &self,
        lhs: &StrippedPartition,
        attribute: usize,
        measure: ErrorMeasure,
    ) -> usize {
        let column = &self.codes[attribute];
        let mut error = 0;
        let mut counts: HashMap<u32, usize> = HashMap::new();

        for class in &lhs.classes {
            match measure {
                ErrorMeasure::RowRatio => {
                    let first = column[class[0] as usize];
                    if class.iter().any(|&row| column[row as usize] != first) {
                        error += class.len();
                    }
                }
                ErrorMeasure::G3 => {
                    counts.clear();
                    let mut largest = 0;
                    for &row in class {
                        let count = counts.entry(column[row as usize]).or_insert(0);
                        *count += 1;
                        largest = largest.max(*count);
                    }
                    error += class.len() - largest;
                }
            }
        }

        self.work
            .fetch_add(lhs.covered_rows() as u64, Ordering::Relaxed);
        error
    }

    /// Fraction of rows that do not count as errors.
    pub fn support(&self, error: usize) -> f64 {
        if self.row_count == 0 {
            1.0
        } else {
            1.0 - error as f64 / self.row_count as f64
        }
    }

    /// Whether `error` rows stay within `tolerance` of the row count.
    pub fn within_tolerance(&self, error: usize, tolerance: f64) -> bool {
        if self.row_count == 0 {
            return true;
        }
        error as f64 / self.row_count as f64 <= tolerance + 1e-12
    }
}
