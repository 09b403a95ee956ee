//! Level generation for the attribute-subset lattice.

use crate::partition::StrippedPartition;
use crate::relation::AttributeSet;
use std::collections::{BTreeMap, HashMap};

/// A lattice node waiting to be evaluated.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub attributes: AttributeSet,
    /// Attributes A ∉ X that no proper subset of X determines
    pub rhs_candidates: AttributeSet,
    /// Index of a previous-level node and the attribute that extends it to X
    pub parent: Option<(usize, usize)>,
}

/// A lattice node after its dependency tests ran.
#[derive(Debug)]
pub(crate) struct EvaluatedNode {
    pub attributes: AttributeSet,
    pub partition: StrippedPartition,
    /// Candidates left undetermined by X and all of its subsets
    pub remaining: AttributeSet,
}

impl EvaluatedNode {
    /// A node with nothing left to determine cannot contribute to any superset.
    pub fn is_alive(&self) -> bool {
        !self.remaining.is_empty()
    }
}

/// Level 1: every searchable attribute on its own.
pub(crate) fn first_level(searchable: &AttributeSet) -> Vec<Candidate> {
    searchable
        .iter()
        .map(|attribute| Candidate {
            attributes: AttributeSet::singleton(attribute),
            rhs_candidates: searchable.without(attribute),
            parent: None,
        })
        .collect()
}

/// Builds level i+1 from the alive nodes of level i.
///
/// Two nodes are joined only when they share their first i−1 attributes, so
/// every child is produced exactly once. A child is kept only if all of its
/// size-i subsets are alive and some right-hand candidate survives the
/// intersection of their remaining sets. Candidates come out sorted.
pub(crate) fn next_level(alive: &[EvaluatedNode]) -> Vec<Candidate> {
    let index: HashMap<&AttributeSet, usize> = alive
        .iter()
        .enumerate()
        .map(|(position, node)| (&node.attributes, position))
        .collect();

    let mut blocks: BTreeMap<AttributeSet, Vec<usize>> = BTreeMap::new();
    for (position, node) in alive.iter().enumerate() {
        let Some(last) = node.attributes.last() else {
            continue;
        };
        blocks
            .entry(node.attributes.without(last))
            .or_default()
            .push(position);
    }

    let mut candidates = Vec::new();
    for members in blocks.values() {
        for (i, &left) in members.iter().enumerate() {
            for &right in &members[i + 1..] {
                let Some(extension) = alive[right].attributes.last() else {
                    continue;
                };
                let child = alive[left].attributes.with(extension);
                if let Some(rhs_candidates) = inherited_candidates(&child, alive, &index) {
                    candidates.push(Candidate {
                        attributes: child,
                        rhs_candidates,
                        parent: Some((left, extension)),
                    });
                }
            }
        }
    }

    candidates.sort_by(|a, b| a.attributes.cmp(&b.attributes));
    candidates
}

/// ∩ remaining(X ∖ {b}) over b ∈ X, minus X; `None` if a subset was pruned
/// or nothing survives.
fn inherited_candidates(
    child: &AttributeSet,
    alive: &[EvaluatedNode],
    index: &HashMap<&AttributeSet, usize>,
) -> Option<AttributeSet> {
    let mut inherited: Option<AttributeSet> = None;
    for subset in child.maximal_subsets() {
        let position = *index.get(&subset)?;
        let remaining = &alive[position].remaining;
        inherited = Some(match inherited {
            Some(current) => current.intersection(remaining),
            None => remaining.clone(),
        });
    }
    let candidates = inherited?.difference(child);
    (!candidates.is_empty()).then_some(candidates)
}
