//! # Term Normal - Functional Dependency Discovery and 3NF Synthesis
//!
//! Term Normal finds the functional dependencies that hold in a table, exactly
//! or within an error tolerance, and uses them to split the table's schema
//! into Third Normal Form. The decomposition is checked to be lossless-join
//! and dependency-preserving before it is returned.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_normal::prelude::*;
//! use term_normal::core::{Normalizer, NormalizerConfig};
//! use term_normal::discovery::DiscoveryConfig;
//! use term_normal::relation::{Relation, Value};
//!
//! # fn example() -> Result<()> {
//! let relation = Relation::new(
//!     ["employee", "department", "manager"],
//!     vec![
//!         vec![Value::from("ada"), Value::from("research"), Value::from("grace")],
//!         vec![Value::from("alan"), Value::from("research"), Value::from("grace")],
//!         vec![Value::from("edsger"), Value::from("systems"), Value::from("ken")],
//!         vec![Value::from("barbara"), Value::from("systems"), Value::from("ken")],
//!     ],
//! )?;
//!
//! let normalizer =
//!     Normalizer::new(NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()));
//! let report = normalizer.run(&relation)?;
//!
//! for schema in &report.schemas {
//!     println!("{}({}) key {:?}", schema.name, schema.attributes.join(", "), schema.key);
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Pipeline
//!
//! Each stage consumes the previous stage's output and can be used on its own:
//!
//! - [`partition`]: stripped partitions and the dependency test
//! - [`discovery`]: level-wise lattice search for minimal dependencies
//! - [`cover`]: minimal cover reduction
//! - [`keys`]: candidate keys and the primary key
//! - [`decompose`]: Bernstein synthesis, chase and preservation checks
//! - [`core`]: the [`Normalizer`](core::Normalizer) driving all of the above
//!
//! Relations come from [`relation::Relation::new`] or from the Arrow and
//! DataFusion adapters in [`sources`].
//!
//! ## Approximate Dependencies
//!
//! Real data is rarely clean. With an error tolerance e, X → A is reported
//! when at most a fraction e of the rows violate it:
//!
//! ```rust
//! use term_normal::discovery::FdDiscovery;
//! use term_normal::partition::ErrorMeasure;
//!
//! let discovery = FdDiscovery::builder()
//!     .error_tolerance(0.05)
//!     .error_measure(ErrorMeasure::G3)
//!     .build();
//! assert!((discovery.config().error_tolerance - 0.05).abs() < f64::EPSILON);
//! ```
//!
//! ## Logging
//!
//! All stages emit `tracing` events. Install a subscriber with
//! [`logging::setup::init_logging`] or use your own.

pub mod core;
pub mod cover;
pub mod decompose;
pub mod dependency;
pub mod discovery;
pub mod error;
pub mod keys;
pub mod logging;
pub mod partition;
pub mod prelude;
pub mod relation;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
