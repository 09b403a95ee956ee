//! The normalization pipeline and its report.
//!
//! [`Normalizer`] sequences the stages over one relation instance:
//!
//! ```text
//! Relation
//!   ├── profile          constants, duplicate columns, unique attributes
//!   ├── discover         minimal dependencies (exact or approximate)
//!   ├── minimal_cover
//!   ├── candidate_keys
//!   └── decompose        3NF schemas, chase, preservation, foreign keys
//! ```
//!
//! Each run owns its own state; nothing is cached between runs.

mod normalizer;
mod report;

pub use normalizer::{Normalization, Normalizer, NormalizerConfig};
pub use report::{DependencyRecord, ForeignKeyRecord, NormalizationReport, SchemaRecord};
