//! Attribute subsets and the schema that names them.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A set of attribute positions within a [`Schema`].
///
/// Backed by an ordered set so equality, hashing and iteration order are
/// canonical. Positions are only meaningful together with the schema they were
/// drawn from; use [`Schema::names`] to render them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeSet(BTreeSet<usize>);

impl AttributeSet {
    /// The empty attribute set.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// A set holding a single attribute.
    pub fn singleton(attribute: usize) -> Self {
        Self(BTreeSet::from([attribute]))
    }

    /// All attributes of a schema with `width` attributes.
    pub fn full(width: usize) -> Self {
        (0..width).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, attribute: usize) -> bool {
        self.0.contains(&attribute)
    }

    /// Adds an attribute, returning true if it was not present.
    pub fn insert(&mut self, attribute: usize) -> bool {
        self.0.insert(attribute)
    }

    /// Removes an attribute, returning true if it was present.
    pub fn remove(&mut self, attribute: usize) -> bool {
        self.0.remove(&attribute)
    }

    /// Returns a copy of this set with `attribute` added.
    pub fn with(&self, attribute: usize) -> Self {
        let mut set = self.clone();
        set.insert(attribute);
        set
    }

    /// Returns a copy of this set with `attribute` removed.
    pub fn without(&self, attribute: usize) -> Self {
        let mut set = self.clone();
        set.remove(attribute);
        set
    }

    pub fn union(&self, other: &AttributeSet) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &AttributeSet) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &AttributeSet) -> Self {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn is_subset(&self, other: &AttributeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &AttributeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Subset that is not equal.
    pub fn is_proper_subset(&self, other: &AttributeSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// Iterates positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Smallest position, if any.
    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Largest position, if any.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Every subset obtained by removing exactly one attribute.
    pub fn maximal_subsets(&self) -> impl Iterator<Item = AttributeSet> + '_ {
        self.iter().map(move |a| self.without(a))
    }
}

impl FromIterator<usize> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|a| a.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

/// The ordered attribute names of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attributes: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, rejecting an empty or duplicated attribute list.
    pub fn new<S: Into<String>>(attributes: impl IntoIterator<Item = S>) -> Result<Self> {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(TermError::input_shape("schema is empty"));
        }

        let mut index = HashMap::with_capacity(attributes.len());
        for (position, name) in attributes.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(TermError::input_shape(format!(
                    "attribute '{name}' appears more than once in the schema"
                )));
            }
        }

        Ok(Self { attributes, index })
    }

    /// Number of attributes.
    pub fn width(&self) -> usize {
        self.attributes.len()
    }

    /// Attribute names in schema order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Name of the attribute at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range for this schema.
    pub fn name(&self, position: usize) -> &str {
        &self.attributes[position]
    }

    /// Position of the named attribute.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TermError::attribute_not_found(name))
    }

    /// Resolves a list of names into an attribute set.
    pub fn attribute_set<S: AsRef<str>>(&self, names: &[S]) -> Result<AttributeSet> {
        names
            .iter()
            .map(|name| self.position(name.as_ref()))
            .collect()
    }

    /// The set of every attribute in the schema.
    pub fn all(&self) -> AttributeSet {
        AttributeSet::full(self.width())
    }

    /// Names of the set's attributes, sorted lexicographically.
    ///
    /// This is the canonical form used for ordering and reporting.
    pub fn names(&self, set: &AttributeSet) -> Vec<String> {
        let mut names: Vec<String> = set.iter().map(|a| self.attributes[a].clone()).collect();
        names.sort();
        names
    }

    /// Compares two attribute sets by their sorted name sequences.
    pub fn compare_sets(&self, a: &AttributeSet, b: &AttributeSet) -> Ordering {
        self.names(a).cmp(&self.names(b))
    }

    /// Attribute positions ordered by name.
    pub fn positions_by_name(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = (0..self.width()).collect();
        positions.sort_by(|a, b| self.attributes[*a].cmp(&self.attributes[*b]));
        positions
    }

    /// Renders a set as `{A, B}` using attribute names.
    pub fn display_set(&self, set: &AttributeSet) -> String {
        format!("{{{}}}", self.names(set).join(", "))
    }
}
