//! Error types for the Term normalization library.
//!
//! All fallible operations return [`Result`], whose error side is [`TermError`].
//! Structural problems (bad input shape, size limits, a failed lossless-join
//! proof) are errors. Degraded-but-usable outcomes such as a partial lattice
//! search or a dependency-preservation warning are carried in the result values
//! instead and never surface here on their own.

use thiserror::Error;

/// The main error type for the Term normalization library.
#[derive(Error, Debug)]
pub enum TermError {
    /// The relation instance is malformed: empty schema, duplicate attribute
    /// names or rows whose width differs from the schema.
    #[error("Invalid relation shape: {message}")]
    InputShape {
        /// Human-readable description of the shape problem
        message: String,
    },

    /// The schema is wider than the configured attribute ceiling.
    #[error("Relation has {attributes} attributes, exceeding the configured limit of {limit}")]
    SizeLimitExceeded {
        /// Number of attributes in the offending relation
        attributes: usize,
        /// Configured `max_attributes`
        limit: usize,
    },

    /// Normalization was requested on a truncated discovery result without
    /// explicitly allowing it.
    #[error("Discovery stopped early ({reason}) after {levels_completed} lattice levels; refusing to normalize a partial dependency set")]
    PartialDiscovery {
        /// Why the lattice search stopped
        reason: String,
        /// Number of fully evaluated lattice levels
        levels_completed: usize,
    },

    /// The chase could not prove the synthesized decomposition lossless.
    #[error("Decomposition invariant violated: {0}")]
    DecompositionInvariantViolation(String),

    /// An attribute name did not resolve against the relation schema.
    #[error("Attribute '{attribute}' not found in schema")]
    AttributeNotFound { attribute: String },

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Table")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
///
/// # Examples
///
/// ```rust
/// use term_normal::error::Result;
///
/// fn discover() -> Result<()> {
///     Ok(())
/// }
/// # discover().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a new input shape error.
    pub fn input_shape(message: impl Into<String>) -> Self {
        Self::InputShape {
            message: message.into(),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new attribute lookup error.
    pub fn attribute_not_found(attribute: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            attribute: attribute.into(),
        }
    }

    /// Returns true for errors that indicate a bug in the normalization core
    /// rather than a problem with the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DecompositionInvariantViolation(_) | Self::Internal(_)
        )
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
            other => TermError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
                other => TermError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
