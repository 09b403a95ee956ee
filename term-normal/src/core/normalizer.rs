//! The end-to-end pipeline.

use super::report::{self, DependencyRecord, NormalizationReport};
use crate::cover::minimal_cover;
use crate::decompose::{decompose, Decomposition};
use crate::dependency::FdSet;
use crate::discovery::{DiscoveryConfig, DiscoveryResult, DiscoveryStatus, FdDiscovery};
use crate::keys::{candidate_keys, CandidateKeys};
use crate::logging::truncate_field;
use crate::perf_debug;
use crate::prelude::*;
use crate::relation::{profile, Relation, RelationProfile, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Configuration for a [`Normalizer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub discovery: DiscoveryConfig,
    /// Normalize on a truncated dependency set instead of failing
    pub allow_partial: bool,
    pub log: LogConfig,
}

impl NormalizerConfig {
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// Every artifact of one run, with attribute positions into `schema`.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub schema: Schema,
    pub profile: RelationProfile,
    pub discovery: DiscoveryResult,
    pub cover: FdSet,
    pub keys: CandidateKeys,
    pub decomposition: Decomposition,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    config: NormalizerConfig,
}

impl Normalization {
    /// Renders the run with attribute names.
    pub fn report(&self) -> NormalizationReport {
        let schema = &self.schema;
        NormalizationReport {
            generated_at: self.generated_at,
            fingerprint: self.fingerprint.clone(),
            attributes: schema.attributes().to_vec(),
            row_count: self.profile.row_count,
            config: self.config.clone(),
            profile: self.profile.clone(),
            status: self.discovery.status.clone(),
            stats: self.discovery.stats.clone(),
            constant_attributes: schema.names(&self.discovery.constant_attributes),
            discovered: DependencyRecord::all(&self.discovery.dependencies, schema),
            cover: DependencyRecord::all(&self.cover, schema),
            candidate_keys: self.keys.iter().map(|key| schema.names(key)).collect(),
            primary_key: schema.names(&self.keys.primary),
            schemas: report::schema_records(&self.decomposition, schema),
            foreign_keys: report::foreign_key_records(&self.decomposition, schema),
            warnings: self
                .decomposition
                .warnings
                .iter()
                .map(|warning| warning.message.clone())
                .collect(),
            elapsed_ms: self.elapsed_ms,
        }
    }
}

/// Runs profiling, discovery, cover reduction, key derivation and 3NF
/// synthesis in order over one relation.
///
/// # Example
///
/// ```rust
/// use term_normal::core::{Normalizer, NormalizerConfig};
/// use term_normal::discovery::DiscoveryConfig;
/// use term_normal::relation::{Relation, Value};
///
/// let relation = Relation::new(
///     ["order_id", "customer", "city"],
///     vec![
///         vec![Value::from(1), Value::from("ann"), Value::from("oslo")],
///         vec![Value::from(2), Value::from("ann"), Value::from("oslo")],
///         vec![Value::from(3), Value::from("bob"), Value::from("rome")],
///         vec![Value::from(4), Value::from("cid"), Value::from("rome")],
///     ],
/// )
/// .unwrap();
///
/// let normalizer =
///     Normalizer::new(NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()));
/// let report = normalizer.run(&relation).unwrap();
///
/// assert_eq!(report.primary_key, vec!["order_id"]);
/// assert_eq!(report.schemas.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes `relation` and returns the serializable report.
    pub fn run(&self, relation: &Relation) -> Result<NormalizationReport> {
        Ok(self.normalize(relation)?.report())
    }

    /// Normalizes `relation` and returns the typed artifacts.
    ///
    /// Fails with [`TermError::PartialDiscovery`] when discovery stopped early
    /// and `allow_partial` is not set. Degenerate instances normalize to a
    /// single schema holding every attribute.
    #[instrument(skip(self, relation), fields(rows = relation.row_count(), attributes = relation.width()))]
    pub fn normalize(&self, relation: &Relation) -> Result<Normalization> {
        let started = Instant::now();
        let generated_at = Utc::now();
        let schema = relation.schema();

        let profile = profile(relation);

        let discovery = FdDiscovery::builder()
            .config(self.config.discovery.clone())
            .log_config(self.config.log.clone())
            .build()
            .discover(relation)?;

        match &discovery.status {
            DiscoveryStatus::Partial {
                reason,
                levels_completed,
            } => {
                if !self.config.allow_partial {
                    return Err(TermError::PartialDiscovery {
                        reason: reason.to_string(),
                        levels_completed: *levels_completed,
                    });
                }
                warn!(%reason, "Normalizing on a partial dependency set");
            }
            DiscoveryStatus::Degenerate { reason } => {
                warn!(?reason, "Degenerate instance; keeping a single schema");
            }
            DiscoveryStatus::Complete => {}
        }

        let cover = minimal_cover(&discovery.dependencies, schema);
        perf_debug!(self.config.log, cover = cover.len(), "Reduced to minimal cover");
        let keys = candidate_keys(schema, &cover);
        perf_debug!(
            self.config.log,
            keys = keys.len(),
            primary = %truncate_field(&schema.display_set(&keys.primary), self.config.log.max_field_length),
            "Derived candidate keys"
        );
        let decomposition = decompose(schema, &cover, &keys)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            dependencies = discovery.dependencies.len(),
            cover = cover.len(),
            keys = keys.len(),
            schemas = decomposition.schemas.len(),
            elapsed_ms,
            "Normalization finished"
        );

        Ok(Normalization {
            schema: schema.clone(),
            profile,
            discovery,
            cover,
            keys,
            decomposition,
            fingerprint: relation.fingerprint(),
            generated_at,
            elapsed_ms,
            config: self.config.clone(),
        })
    }
}
