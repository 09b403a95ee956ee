//! Prelude for commonly used types and traits in term-normal.

pub use crate::error::{ErrorContext, Result, TermError};
pub use crate::logging::LogConfig;
