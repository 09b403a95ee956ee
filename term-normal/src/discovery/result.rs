//! Discovery outcomes.

use crate::dependency::{FdSet, FunctionalDependency};
use crate::relation::AttributeSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a relation was too small for dependencies to mean anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateReason {
    /// No rows: every dependency holds vacuously.
    EmptyRelation,
    /// One row: every dependency holds trivially.
    SingleRow,
}

/// Why the lattice search stopped before exhausting the lattice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartialReason {
    LevelCap { max_level: usize },
    Deadline { elapsed_ms: u64 },
    RowBudget { budget: u64, used: u64 },
}

impl fmt::Display for PartialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialReason::LevelCap { max_level } => {
                write!(f, "lattice level cap {max_level} reached")
            }
            PartialReason::Deadline { elapsed_ms } => {
                write!(f, "deadline expired after {elapsed_ms} ms")
            }
            PartialReason::RowBudget { budget, used } => {
                write!(f, "row budget {budget} exhausted ({used} rows touched)")
            }
        }
    }
}

/// How complete a discovery result is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscoveryStatus {
    /// The whole lattice was searched.
    Complete,
    /// The search was truncated; more minimal dependencies may exist.
    Partial {
        reason: PartialReason,
        levels_completed: usize,
    },
    /// The instance is too small for dependencies to carry information.
    Degenerate { reason: DegenerateReason },
}

/// Counters describing the work of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub levels_completed: usize,
    pub nodes_evaluated: usize,
    pub nodes_pruned: usize,
    pub rows_touched: u64,
    pub elapsed_ms: u64,
}

/// Minimal dependencies found on an instance, plus how the search ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub status: DiscoveryStatus,
    /// Minimal dependencies in canonical order (right-hand name, left-hand names)
    pub dependencies: FdSet,
    /// Columns with a single distinct value; never part of a dependency
    pub constant_attributes: AttributeSet,
    pub stats: DiscoveryStats,
}

impl DiscoveryResult {
    pub(crate) fn degenerate(reason: DegenerateReason) -> Self {
        Self {
            status: DiscoveryStatus::Degenerate { reason },
            dependencies: FdSet::new(),
            constant_attributes: AttributeSet::empty(),
            stats: DiscoveryStats::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, DiscoveryStatus::Complete)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.status, DiscoveryStatus::Partial { .. })
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.status, DiscoveryStatus::Degenerate { .. })
    }

    /// Minimal left-hand sides grouped by right-hand attribute.
    pub fn by_rhs(&self) -> BTreeMap<usize, Vec<&FunctionalDependency>> {
        let mut grouped: BTreeMap<usize, Vec<&FunctionalDependency>> = BTreeMap::new();
        for fd in &self.dependencies {
            grouped.entry(fd.rhs).or_default().push(fd);
        }
        grouped
    }

    /// The reported dependency X → A, if any.
    pub fn get(&self, lhs: &AttributeSet, rhs: usize) -> Option<&FunctionalDependency> {
        self.dependencies
            .iter()
            .find(|fd| fd.rhs == rhs && &fd.lhs == lhs)
    }
}
