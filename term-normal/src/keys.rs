//! Candidate key derivation.
//!
//! Attributes split into three groups under a cover:
//!
//! - never on a right-hand side: nothing determines them, so every key holds them
//! - only on right-hand sides: always determined, so no minimal key holds them
//! - on both sides: may or may not be part of a key
//!
//! The search starts from the first group and adds combinations of the third in
//! increasing size, skipping supersets of keys already found.

use crate::dependency::FdSet;
use crate::relation::{AttributeSet, Schema};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// All candidate keys of a schema plus the designated primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateKeys {
    /// Sorted by size, then by sorted attribute names
    pub keys: Vec<AttributeSet>,
    /// The first key in that order
    pub primary: AttributeSet,
}

impl CandidateKeys {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeSet> + '_ {
        self.keys.iter()
    }

    /// Whether `attributes` is exactly one of the candidate keys.
    pub fn is_key(&self, attributes: &AttributeSet) -> bool {
        self.keys.contains(attributes)
    }

    /// Whether `attributes` contains some candidate key.
    pub fn contains_key(&self, attributes: &AttributeSet) -> bool {
        self.keys.iter().any(|key| key.is_subset(attributes))
    }

    /// Attributes that belong to at least one key.
    pub fn prime_attributes(&self) -> AttributeSet {
        self.keys
            .iter()
            .fold(AttributeSet::empty(), |acc, key| acc.union(key))
    }

    pub fn display(&self, schema: &Schema) -> Vec<String> {
        self.keys.iter().map(|key| schema.display_set(key)).collect()
    }
}

/// Finds every candidate key of `schema` under `cover`.
///
/// The schema itself is always a superkey, so at least one key exists.
#[instrument(skip_all, fields(attributes = schema.width(), dependencies = cover.len()))]
pub fn candidate_keys(schema: &Schema, cover: &FdSet) -> CandidateKeys {
    let full = schema.all();
    let mut on_rhs = AttributeSet::empty();
    let mut on_lhs = AttributeSet::empty();
    for fd in cover {
        on_rhs.insert(fd.rhs);
        on_lhs = on_lhs.union(&fd.lhs);
    }

    let core = full.difference(&on_rhs);
    let middle: Vec<usize> = schema
        .positions_by_name()
        .into_iter()
        .filter(|&attribute| on_rhs.contains(attribute) && on_lhs.contains(attribute))
        .collect();

    let index = cover.closure_index();
    let mut keys: Vec<AttributeSet> = Vec::new();
    if index.closure(&core) == full {
        keys.push(core.clone());
    } else {
        for size in 1..=middle.len() {
            for combination in Combinations::new(middle.len(), size) {
                let candidate = combination
                    .iter()
                    .fold(core.clone(), |acc, &index| acc.with(middle[index]));
                if keys.iter().any(|key| key.is_subset(&candidate)) {
                    continue;
                }
                if index.closure(&candidate) == full {
                    keys.push(candidate);
                }
            }
        }
    }

    if keys.is_empty() {
        // unreachable for a consistent cover; the full schema is a superkey
        keys.push(full);
    }

    keys.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| schema.compare_sets(a, b))
    });
    let primary = keys[0].clone();

    debug!(
        keys = keys.len(),
        primary = %schema.display_set(&primary),
        core = %schema.display_set(&core),
        "Derived candidate keys"
    );

    CandidateKeys { keys, primary }
}

/// k-subsets of 0..n as ascending index vectors, in lexicographic order.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        let mut position = k;
        while position > 0 {
            position -= 1;
            if self.indices[position] < self.n - k + position {
                self.indices[position] += 1;
                for next in position + 1..k {
                    self.indices[next] = self.indices[next - 1] + 1;
                }
                return Some(current);
            }
        }
        self.done = true;
        Some(current)
    }
}
