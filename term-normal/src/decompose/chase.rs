//! Lossless-join test by the chase.
//!
//! The tableau has one row per schema and one column per attribute. A cell
//! holds the distinguished symbol 0 when the schema contains the attribute and
//! a symbol unique to that cell otherwise. Dependencies are applied until
//! nothing changes: rows agreeing on X get their A symbols equated, preferring
//! the smallest symbol. The join is lossless iff some row ends up all 0.

use crate::dependency::FdSet;
use crate::relation::AttributeSet;
use std::collections::HashMap;

const DISTINGUISHED: usize = 0;

/// Outcome of chasing a decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaseOutcome {
    /// Row of the first schema that became fully distinguished, if any
    pub witness: Option<usize>,
    /// Passes over the dependency set until the fixpoint
    pub passes: usize,
}

impl ChaseOutcome {
    pub fn is_lossless(&self) -> bool {
        self.witness.is_some()
    }
}

/// Chases the tableau of `schemas` over `width` attributes under `fds`.
pub fn chase(width: usize, schemas: &[AttributeSet], fds: &FdSet) -> ChaseOutcome {
    let mut tableau: Vec<Vec<usize>> = schemas
        .iter()
        .enumerate()
        .map(|(row, attributes)| {
            (0..width)
                .map(|column| {
                    if attributes.contains(column) {
                        DISTINGUISHED
                    } else {
                        1 + row * width + column
                    }
                })
                .collect()
        })
        .collect();

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for fd in fds {
            let lhs: Vec<usize> = fd.lhs.iter().collect();
            let mut groups: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
            for (row, symbols) in tableau.iter().enumerate() {
                let key: Vec<usize> = lhs.iter().map(|&column| symbols[column]).collect();
                groups.entry(key).or_default().push(row);
            }

            for rows in groups.values().filter(|rows| rows.len() > 1) {
                let target = rows
                    .iter()
                    .map(|&row| tableau[row][fd.rhs])
                    .min()
                    .unwrap_or(DISTINGUISHED);
                for &row in rows {
                    let replaced = tableau[row][fd.rhs];
                    if replaced != target {
                        equate(&mut tableau, fd.rhs, replaced, target);
                        changed = true;
                    }
                }
            }
        }
        if !changed || tableau.iter().any(|symbols| is_distinguished(symbols)) {
            break;
        }
    }

    let witness = tableau
        .iter()
        .position(|symbols| is_distinguished(symbols));
    ChaseOutcome { witness, passes }
}

fn is_distinguished(symbols: &[usize]) -> bool {
    symbols.iter().all(|&symbol| symbol == DISTINGUISHED)
}

/// Renames `from` to `to` everywhere in one column.
fn equate(tableau: &mut [Vec<usize>], column: usize, from: usize, to: usize) {
    for symbols in tableau.iter_mut() {
        if symbols[column] == from {
            symbols[column] = to;
        }
    }
}
