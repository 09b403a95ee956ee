//! Level-wise discovery of minimal functional dependencies.
//!
//! The search walks the lattice of attribute subsets bottom-up, one level per
//! iteration:
//!
//! 1. Level 1 holds every non-constant attribute.
//! 2. Each node X is tested against its right-hand candidates: the attributes
//!    that no proper subset of X determines. Valid X → A are reported and A is
//!    removed from X's candidates; a node left with no candidates is pruned.
//! 3. Level i+1 is formed by joining alive level-i nodes that share their first
//!    i−1 attributes.
//!
//! Nodes of one level are independent, so they are evaluated on scoped worker
//! threads. The level boundary is the synchronization point: results are merged
//! in canonical order there, which keeps the output identical for any number of
//! workers. Level caps, deadlines and row budgets are only checked at that
//! boundary, so a truncated run never reports half a level.
//!
//! # Example
//!
//! ```rust
//! use term_normal::discovery::FdDiscovery;
//! use term_normal::relation::{Relation, Value};
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
//! let result = FdDiscovery::builder()
//!     .error_tolerance(0.0)
//!     .build()
//!     .discover(&relation)
//!     .unwrap();
//!
//! assert!(result.is_complete());
//! assert_eq!(
//!     result.dependencies.display(relation.schema()),
//!     vec!["{instructor} -> course", "{course} -> instructor"]
//! );
//! ```

mod config;
mod lattice;
mod result;

pub use config::DiscoveryConfig;
pub use result::{DegenerateReason, DiscoveryResult, DiscoveryStats, DiscoveryStatus, PartialReason};

use crate::dependency::{FdSet, FunctionalDependency};
use crate::log_lattice;
use crate::logging::truncate_field;
use crate::partition::{ErrorMeasure, PartitionEngine};
use crate::prelude::*;
use crate::relation::{AttributeSet, Relation};
use lattice::{Candidate, EvaluatedNode};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn, Span};

/// Builder for [`FdDiscovery`].
#[derive(Debug, Clone, Default)]
pub struct FdDiscoveryBuilder {
    config: DiscoveryConfig,
    log_config: LogConfig,
}

impl FdDiscoveryBuilder {
    /// Set the tolerated fraction of error rows
    pub fn error_tolerance(mut self, tolerance: f64) -> Self {
        self.config.error_tolerance = tolerance;
        self
    }

    /// Set how error rows are counted
    pub fn error_measure(mut self, measure: ErrorMeasure) -> Self {
        self.config.error_measure = measure;
        self
    }

    /// Set the schema width above which discovery refuses to run
    pub fn max_attributes(mut self, limit: usize) -> Self {
        self.config.max_attributes = limit;
        self
    }

    /// Stop after this many lattice levels
    pub fn max_lattice_level(mut self, level: usize) -> Self {
        self.config.max_lattice_level = Some(level);
        self
    }

    /// Stop at the first level boundary after this much time
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    /// Stop at the first level boundary after touching this many rows
    pub fn row_budget(mut self, rows: u64) -> Self {
        self.config.row_budget = Some(rows);
        self
    }

    /// Set the number of worker threads per level
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Build the FdDiscovery
    pub fn build(self) -> FdDiscovery {
        FdDiscovery {
            config: self.config,
            log_config: self.log_config,
        }
    }
}

/// The functional dependency discovery engine.
#[derive(Debug, Clone, Default)]
pub struct FdDiscovery {
    config: DiscoveryConfig,
    log_config: LogConfig,
}

impl FdDiscovery {
    /// Create a new builder for FdDiscovery
    pub fn builder() -> FdDiscoveryBuilder {
        FdDiscoveryBuilder::default()
    }

    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discovers the minimal dependencies holding on `relation`.
    ///
    /// Fails with [`TermError::SizeLimitExceeded`] before searching when the
    /// schema is wider than `max_attributes`. Relations with fewer than two
    /// rows produce a [`DiscoveryStatus::Degenerate`] result.
    #[instrument(skip(self, relation), fields(rows = relation.row_count(), attributes = relation.width()))]
    pub fn discover(&self, relation: &Relation) -> Result<DiscoveryResult> {
        self.config.validate()?;
        if relation.width() > self.config.max_attributes {
            return Err(TermError::SizeLimitExceeded {
                attributes: relation.width(),
                limit: self.config.max_attributes,
            });
        }

        match relation.row_count() {
            0 => {
                warn!("Relation has no rows; every dependency holds vacuously");
                return Ok(DiscoveryResult::degenerate(DegenerateReason::EmptyRelation));
            }
            1 => {
                warn!("Relation has a single row; every dependency holds trivially");
                return Ok(DiscoveryResult::degenerate(DegenerateReason::SingleRow));
            }
            _ => {}
        }

        let started = Instant::now();
        let engine = PartitionEngine::new(relation);
        let schema = relation.schema();

        let constants: AttributeSet = (0..relation.width())
            .filter(|&attribute| engine.is_constant(attribute))
            .collect();
        if !constants.is_empty() {
            info!(
                constants = %schema.display_set(&constants),
                "Excluding constant attributes from the search"
            );
        }
        let searchable = schema.all().difference(&constants);

        let mut dependencies = Vec::new();
        let mut stats = DiscoveryStats::default();
        let mut previous: Vec<EvaluatedNode> = Vec::new();
        let mut candidates = lattice::first_level(&searchable);
        let mut level = 1;

        let status = loop {
            if candidates.is_empty() {
                break DiscoveryStatus::Complete;
            }
            if let Some(reason) = self.stop_reason(level, started, &engine) {
                warn!(%reason, levels_completed = stats.levels_completed, "Stopping discovery early");
                break DiscoveryStatus::Partial {
                    reason,
                    levels_completed: stats.levels_completed,
                };
            }

            let evaluated = self.evaluate_level(&engine, &previous, &candidates, &mut dependencies);
            stats.nodes_evaluated += evaluated.len();
            stats.levels_completed = level;

            let alive: Vec<EvaluatedNode> =
                evaluated.into_iter().filter(EvaluatedNode::is_alive).collect();
            stats.nodes_pruned += candidates.len() - alive.len();

            if self.log_config.log_partition_stats {
                debug!(
                    level,
                    nodes = candidates.len(),
                    alive = alive.len(),
                    dependencies = dependencies.len(),
                    rows_touched = engine.work_done(),
                    "Evaluated lattice level"
                );
            }

            candidates = lattice::next_level(&alive);
            previous = alive;
            level += 1;
        };

        let mut dependencies: FdSet = dependencies.into_iter().collect();
        dependencies.sort_canonical(schema);

        stats.rows_touched = engine.work_done();
        stats.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            dependencies = dependencies.len(),
            levels = stats.levels_completed,
            nodes = stats.nodes_evaluated,
            elapsed_ms = stats.elapsed_ms,
            "Discovery finished"
        );

        Ok(DiscoveryResult {
            status,
            dependencies,
            constant_attributes: constants,
            stats,
        })
    }

    /// Checks the level cap, deadline and row budget before starting `level`.
    fn stop_reason(
        &self,
        level: usize,
        started: Instant,
        engine: &PartitionEngine,
    ) -> Option<PartialReason> {
        if let Some(max_level) = self.config.max_lattice_level {
            if level > max_level {
                return Some(PartialReason::LevelCap { max_level });
            }
        }
        if let Some(deadline) = self.config.deadline {
            let elapsed = started.elapsed();
            if elapsed >= deadline {
                return Some(PartialReason::Deadline {
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
        }
        if let Some(budget) = self.config.row_budget {
            let used = engine.work_done();
            if used >= budget {
                return Some(PartialReason::RowBudget { budget, used });
            }
        }
        None
    }

    /// Evaluates every candidate of one level, in parallel when configured.
    ///
    /// Workers receive contiguous chunks and results are concatenated in chunk
    /// order, so the returned nodes follow the candidate order.
    fn evaluate_level(
        &self,
        engine: &PartitionEngine,
        previous: &[EvaluatedNode],
        candidates: &[Candidate],
        dependencies: &mut Vec<FunctionalDependency>,
    ) -> Vec<EvaluatedNode> {
        let workers = self.config.workers.clamp(1, candidates.len().max(1));

        let results: Vec<(EvaluatedNode, Vec<FunctionalDependency>)> = if workers == 1 {
            candidates
                .iter()
                .map(|candidate| self.evaluate(engine, previous, candidate))
                .collect()
        } else {
            let chunk_size = candidates.len().div_ceil(workers);
            // workers log into the caller's subscriber and span
            let span = &Span::current();
            let dispatch = &tracing::dispatcher::get_default(|current| current.clone());
            std::thread::scope(|scope| {
                let handles: Vec<_> = candidates
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            tracing::dispatcher::with_default(dispatch, || {
                                let _entered = span.enter();
                                chunk
                                    .iter()
                                    .map(|candidate| self.evaluate(engine, previous, candidate))
                                    .collect::<Vec<_>>()
                            })
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                    })
                    .collect()
            })
        };

        results
            .into_iter()
            .map(|(node, found)| {
                dependencies.extend(found);
                node
            })
            .collect()
    }

    /// Computes π(X) and tests X → A for every right-hand candidate A.
    fn evaluate(
        &self,
        engine: &PartitionEngine,
        previous: &[EvaluatedNode],
        candidate: &Candidate,
    ) -> (EvaluatedNode, Vec<FunctionalDependency>) {
        let partition = match candidate.parent {
            Some((parent, extension)) => engine.refine(&previous[parent].partition, extension),
            None => engine.partition(&candidate.attributes),
        };

        let mut remaining = candidate.rhs_candidates.clone();
        let mut found = Vec::new();
        for rhs in candidate.rhs_candidates.iter() {
            let error = engine.dependency_error(&partition, rhs, self.config.error_measure);
            if engine.within_tolerance(error, self.config.error_tolerance) {
                found.push(FunctionalDependency::with_support(
                    candidate.attributes.clone(),
                    rhs,
                    engine.support(error),
                ));
                remaining.remove(rhs);
            }
        }

        log_lattice!(
            self.log_config,
            node = %truncate_field(&candidate.attributes.to_string(), self.log_config.max_field_length),
            classes = partition.class_count(),
            found = found.len(),
            remaining = remaining.len(),
            "Evaluated lattice node"
        );

        (
            EvaluatedNode {
                attributes: candidate.attributes.clone(),
                partition,
                remaining,
            },
            found,
        )
    }
}
