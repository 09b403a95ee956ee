//! Minimal cover computation.
//!
//! A minimal cover of F is an equivalent dependency set where every right-hand
//! side is a single attribute, no left-hand attribute is extraneous and no
//! dependency is implied by the others. Covers are not unique; this reducer
//! walks dependencies in canonical order so the same input always yields the
//! same cover.

use crate::dependency::{ClosureIndex, FdSet, FunctionalDependency};
use crate::relation::Schema;
use tracing::{debug, instrument};

/// Reduces `fds` to a minimal cover, sorted canonically.
///
/// Dependencies keep the support of the dependency they were reduced from.
/// Trivial dependencies (A ∈ X) are dropped.
#[instrument(skip_all, fields(input = fds.len()))]
pub fn minimal_cover(fds: &FdSet, schema: &Schema) -> FdSet {
    let mut working: Vec<FunctionalDependency> =
        fds.iter().filter(|fd| !fd.is_trivial()).cloned().collect();
    working.sort_by(|a, b| a.canonical_cmp(b, schema));

    // Reducing a left-hand side keeps the set equivalent, so closures under
    // the initial set stay valid for the whole extraneous-attribute pass.
    let snapshot = working.clone();
    let index = ClosureIndex::new(&snapshot);
    let mut reduced_attributes = 0;
    loop {
        let mut changed = false;
        for fd in working.iter_mut() {
            let candidates: Vec<usize> = fd.lhs.iter().collect();
            for attribute in candidates {
                if fd.lhs.len() < 2 || !fd.lhs.contains(attribute) {
                    continue;
                }
                let smaller = fd.lhs.without(attribute);
                if index.implies(&smaller, fd.rhs) {
                    fd.lhs = smaller;
                    reduced_attributes += 1;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut deduplicated: Vec<FunctionalDependency> =
        working.into_iter().collect::<FdSet>().into_vec();
    deduplicated.sort_by(|a, b| a.canonical_cmp(b, schema));

    let index = ClosureIndex::new(&deduplicated);
    let mut redundant = vec![false; deduplicated.len()];
    for position in 0..deduplicated.len() {
        let fd = &deduplicated[position];
        if index.implies_without(&fd.lhs, fd.rhs, |other| {
            other == position || redundant[other]
        }) {
            redundant[position] = true;
        }
    }
    let removed = redundant.iter().filter(|r| **r).count();
    let deduplicated: Vec<FunctionalDependency> = deduplicated
        .into_iter()
        .zip(&redundant)
        .filter(|(_, redundant)| !**redundant)
        .map(|(fd, _)| fd)
        .collect();

    let mut cover: FdSet = deduplicated.into_iter().collect();
    cover.sort_canonical(schema);
    debug!(
        output = cover.len(),
        reduced_attributes, removed, "Computed minimal cover"
    );
    cover
}

/// Whether `cover` is a minimal cover equivalent to `original`.
pub fn is_minimal_cover(cover: &FdSet, original: &FdSet) -> bool {
    if !cover.equivalent_to(original) {
        return false;
    }
    let index = cover.closure_index();
    for (position, fd) in cover.iter().enumerate() {
        if fd.is_trivial() {
            return false;
        }
        if index.implies_without(&fd.lhs, fd.rhs, |other| other == position) {
            return false;
        }
        if fd.lhs.len() > 1
            && fd
                .lhs
                .iter()
                .any(|attribute| index.implies(&fd.lhs.without(attribute), fd.rhs))
        {
            return false;
        }
    }
    true
}
