//! Functional dependencies, dependency sets and attribute closure.

use crate::relation::{AttributeSet, Schema};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// X → A with the fraction of rows supporting it.
///
/// `support` is 1.0 for exact dependencies. Dependencies derived by reasoning
/// (rather than measured on data) keep the support of the measured dependency
/// they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub lhs: AttributeSet,
    pub rhs: usize,
    pub support: f64,
}

impl FunctionalDependency {
    /// An exact dependency.
    pub fn new(lhs: AttributeSet, rhs: usize) -> Self {
        Self::with_support(lhs, rhs, 1.0)
    }

    pub fn with_support(lhs: AttributeSet, rhs: usize, support: f64) -> Self {
        Self { lhs, rhs, support }
    }

    /// Builds a dependency from attribute names.
    pub fn from_names<S: AsRef<str>>(
        schema: &Schema,
        lhs: &[S],
        rhs: &str,
    ) -> crate::error::Result<Self> {
        Ok(Self::new(schema.attribute_set(lhs)?, schema.position(rhs)?))
    }

    /// True when A ∈ X.
    pub fn is_trivial(&self) -> bool {
        self.lhs.contains(self.rhs)
    }

    pub fn is_exact(&self) -> bool {
        self.support >= 1.0 - 1e-12
    }

    /// All attributes the dependency mentions.
    pub fn attributes(&self) -> AttributeSet {
        self.lhs.with(self.rhs)
    }

    /// Same left- and right-hand side, regardless of support.
    pub fn same_as(&self, other: &FunctionalDependency) -> bool {
        self.rhs == other.rhs && self.lhs == other.lhs
    }

    /// Canonical order: right-hand name, then sorted left-hand names.
    pub fn canonical_cmp(&self, other: &FunctionalDependency, schema: &Schema) -> Ordering {
        schema
            .name(self.rhs)
            .cmp(schema.name(other.rhs))
            .then_with(|| schema.compare_sets(&self.lhs, &other.lhs))
    }

    /// Renders as `{A, B} -> C`.
    pub fn display(&self, schema: &Schema) -> String {
        format!("{} -> {}", schema.display_set(&self.lhs), schema.name(self.rhs))
    }
}

/// Closure of `start` under `fds`: every attribute reachable by repeatedly
/// applying dependencies whose left-hand side is already contained.
pub fn closure<'a, I>(start: &AttributeSet, fds: I) -> AttributeSet
where
    I: IntoIterator<Item = &'a FunctionalDependency>,
{
    ClosureIndex::new(fds).closure(start)
}

/// Dependencies indexed by left-hand attribute for repeated closure queries.
///
/// Each query keeps a counter of missing left-hand attributes per dependency
/// and fires a dependency when its counter reaches zero, so one closure costs
/// time linear in the total size of the indexed left-hand sides.
#[derive(Debug, Clone)]
pub struct ClosureIndex<'a> {
    fds: Vec<&'a FunctionalDependency>,
    by_attribute: HashMap<usize, Vec<usize>>,
    unconditional: Vec<usize>,
}

impl<'a> ClosureIndex<'a> {
    pub fn new<I>(fds: I) -> Self
    where
        I: IntoIterator<Item = &'a FunctionalDependency>,
    {
        let fds: Vec<&FunctionalDependency> = fds.into_iter().collect();
        let mut by_attribute: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut unconditional = Vec::new();
        for (index, fd) in fds.iter().enumerate() {
            if fd.lhs.is_empty() {
                unconditional.push(index);
            }
            for attribute in fd.lhs.iter() {
                by_attribute.entry(attribute).or_default().push(index);
            }
        }
        Self {
            fds,
            by_attribute,
            unconditional,
        }
    }

    pub fn len(&self) -> usize {
        self.fds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }

    /// Closure of `start` under every indexed dependency.
    pub fn closure(&self, start: &AttributeSet) -> AttributeSet {
        self.expand(start, |_| false, None)
    }

    /// Whether `rhs` lies in the closure of `lhs`. Stops as soon as it does.
    pub fn implies(&self, lhs: &AttributeSet, rhs: usize) -> bool {
        self.expand(lhs, |_| false, Some(rhs)).contains(rhs)
    }

    /// Like [`implies`](Self::implies), ignoring the dependencies at positions
    /// for which `skip` returns true.
    pub fn implies_without(
        &self,
        lhs: &AttributeSet,
        rhs: usize,
        skip: impl Fn(usize) -> bool,
    ) -> bool {
        self.expand(lhs, skip, Some(rhs)).contains(rhs)
    }

    fn expand(
        &self,
        start: &AttributeSet,
        skip: impl Fn(usize) -> bool,
        target: Option<usize>,
    ) -> AttributeSet {
        let mut reached = start.clone();
        if target.is_some_and(|target| reached.contains(target)) {
            return reached;
        }

        let mut missing: Vec<usize> = self.fds.iter().map(|fd| fd.lhs.len()).collect();
        let mut pending: Vec<usize> = start.iter().collect();
        let fire = |index: usize, reached: &mut AttributeSet, pending: &mut Vec<usize>| {
            let rhs = self.fds[index].rhs;
            if !skip(index) && reached.insert(rhs) {
                pending.push(rhs);
            }
            target == Some(rhs) && reached.contains(rhs)
        };

        for &index in &self.unconditional {
            if fire(index, &mut reached, &mut pending) {
                return reached;
            }
        }
        while let Some(attribute) = pending.pop() {
            let Some(dependents) = self.by_attribute.get(&attribute) else {
                continue;
            };
            for &index in dependents {
                missing[index] -= 1;
                if missing[index] == 0 && fire(index, &mut reached, &mut pending) {
                    return reached;
                }
            }
        }
        reached
    }
}

/// An ordered collection of functional dependencies.
///
/// `(X, A)` pairs are kept unique through a hash index, so building a set
/// from `n` dependencies is linear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FdSet {
    fds: Vec<FunctionalDependency>,
    #[serde(skip)]
    index: HashSet<(AttributeSet, usize)>,
}

impl PartialEq for FdSet {
    fn eq(&self, other: &Self) -> bool {
        self.fds == other.fds
    }
}

impl FdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dependency. A repeat of an existing X → A keeps the higher support.
    pub fn push(&mut self, fd: FunctionalDependency) {
        if self.index.len() != self.fds.len() {
            // deserialized sets arrive without their index
            self.index = self.fds.iter().map(|fd| (fd.lhs.clone(), fd.rhs)).collect();
        }
        if self.index.insert((fd.lhs.clone(), fd.rhs)) {
            self.fds.push(fd);
        } else if let Some(existing) = self.fds.iter_mut().find(|existing| existing.same_as(&fd)) {
            existing.support = existing.support.max(fd.support);
        }
    }

    pub fn len(&self) -> usize {
        self.fds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FunctionalDependency> {
        self.fds.iter()
    }

    pub fn as_slice(&self) -> &[FunctionalDependency] {
        &self.fds
    }

    pub fn into_vec(self) -> Vec<FunctionalDependency> {
        self.fds
    }

    /// Whether X → A is in the set (ignoring support).
    pub fn contains(&self, lhs: &AttributeSet, rhs: usize) -> bool {
        if self.index.len() == self.fds.len() {
            self.index.contains(&(lhs.clone(), rhs))
        } else {
            self.fds.iter().any(|fd| fd.rhs == rhs && &fd.lhs == lhs)
        }
    }

    /// Closure of `attributes` under this set.
    pub fn closure(&self, attributes: &AttributeSet) -> AttributeSet {
        closure(attributes, &self.fds)
    }

    /// Index for answering many closure queries over this set.
    pub fn closure_index(&self) -> ClosureIndex<'_> {
        ClosureIndex::new(&self.fds)
    }

    /// Whether X → A follows from this set by Armstrong's axioms.
    pub fn implies(&self, lhs: &AttributeSet, rhs: usize) -> bool {
        lhs.contains(rhs) || self.closure_index().implies(lhs, rhs)
    }

    /// Whether every dependency of `other` follows from this set.
    pub fn implies_all(&self, other: &FdSet) -> bool {
        let index = self.closure_index();
        other.iter().all(|fd| index.implies(&fd.lhs, fd.rhs))
    }

    /// Logical equivalence: each set implies the other.
    pub fn equivalent_to(&self, other: &FdSet) -> bool {
        self.implies_all(other) && other.implies_all(self)
    }

    /// Dependencies whose attributes all lie within `attributes`.
    pub fn embedded_in(&self, attributes: &AttributeSet) -> FdSet {
        self.fds
            .iter()
            .filter(|fd| fd.attributes().is_subset(attributes))
            .cloned()
            .collect()
    }

    /// Distinct left-hand sides in first-appearance order.
    pub fn left_hand_sides(&self) -> Vec<AttributeSet> {
        let mut seen: HashSet<&AttributeSet> = HashSet::new();
        self.fds
            .iter()
            .filter(|fd| seen.insert(&fd.lhs))
            .map(|fd| fd.lhs.clone())
            .collect()
    }

    /// Sorts by right-hand name, then sorted left-hand names.
    pub fn sort_canonical(&mut self, schema: &Schema) {
        self.fds.sort_by(|a, b| a.canonical_cmp(b, schema));
    }

    /// Renders every dependency with attribute names.
    pub fn display(&self, schema: &Schema) -> Vec<String> {
        self.fds.iter().map(|fd| fd.display(schema)).collect()
    }
}

impl FromIterator<FunctionalDependency> for FdSet {
    fn from_iter<I: IntoIterator<Item = FunctionalDependency>>(iter: I) -> Self {
        let mut set = FdSet::new();
        for fd in iter {
            set.push(fd);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FdSet {
    type Item = &'a FunctionalDependency;
    type IntoIter = std::slice::Iter<'a, FunctionalDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.fds.iter()
    }
}

impl IntoIterator for FdSet {
    type Item = FunctionalDependency;
    type IntoIter = std::vec::IntoIter<FunctionalDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.fds.into_iter()
    }
}
