//! Dependency preservation by restricted closure.
//!
//! X → A is preserved when A is reachable from X using only reasoning local to
//! the schemas: repeatedly add `closure(Z ∩ Ri) ∩ Ri` for every schema Ri. This
//! never materializes the projected dependency sets, which can be exponential.

use crate::dependency::{ClosureIndex, FdSet, FunctionalDependency};
use crate::relation::AttributeSet;

/// Attributes reachable from `start` through the schemas alone.
pub fn restricted_closure(
    start: &AttributeSet,
    schemas: &[AttributeSet],
    fds: &FdSet,
) -> AttributeSet {
    reach(start, schemas, &fds.closure_index())
}

fn reach(start: &AttributeSet, schemas: &[AttributeSet], index: &ClosureIndex<'_>) -> AttributeSet {
    let mut reached = start.clone();
    loop {
        let before = reached.len();
        for attributes in schemas {
            let local = index.closure(&reached.intersection(attributes));
            reached = reached.union(&local.intersection(attributes));
        }
        if reached.len() == before {
            return reached;
        }
    }
}

/// Dependencies of `fds` that the schemas fail to preserve.
///
/// A dependency embedded in one schema is preserved outright; only the others
/// go through the restricted closure.
pub fn unpreserved<'a>(
    schemas: &[AttributeSet],
    fds: &'a FdSet,
) -> Vec<&'a FunctionalDependency> {
    let leftovers: Vec<&FunctionalDependency> = fds
        .iter()
        .filter(|fd| {
            let attributes = fd.attributes();
            !schemas.iter().any(|schema| attributes.is_subset(schema))
        })
        .collect();
    if leftovers.is_empty() {
        return leftovers;
    }

    let index = fds.closure_index();
    leftovers
        .into_iter()
        .filter(|fd| !reach(&fd.lhs, schemas, &index).contains(fd.rhs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(attrs: &[usize]) -> AttributeSet {
        attrs.iter().copied().collect()
    }

    fn fds(specs: &[(&[usize], usize)]) -> FdSet {
        specs
            .iter()
            .map(|(lhs, rhs)| FunctionalDependency::new(set(lhs), *rhs))
            .collect()
    }

    #[test]
    fn test_preserved_through_chain_of_schemas() {
        // a -> b, b -> c with schemas (a, b), (b, c): a -> c is preserved too
        let fds = fds(&[(&[0], 1), (&[1], 2), (&[0], 2)]);
        let schemas = [set(&[0, 1]), set(&[1, 2])];
        assert!(unpreserved(&schemas, &fds).is_empty());
        assert_eq!(restricted_closure(&set(&[0]), &schemas, &fds), set(&[0, 1, 2]));
    }

    #[test]
    fn test_classic_bcnf_loss() {
        // {a, b} -> c, c -> b split into (a, c) and (c, b): {a, b} -> c is lost
        let fds = fds(&[(&[0, 1], 2), (&[2], 1)]);
        let schemas = [set(&[0, 2]), set(&[1, 2])];
        let lost = unpreserved(&schemas, &fds);
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].rhs, 2);
    }

    #[test]
    fn test_embedded_dependencies_skip_the_closure() {
        // every dependency fits inside a schema, so nothing is reported
        let fds = fds(&[(&[0], 1), (&[0], 2), (&[3], 4)]);
        let schemas = [set(&[0, 1, 2]), set(&[0, 3]), set(&[3, 4])];
        assert!(unpreserved(&schemas, &fds).is_empty());
    }
}
