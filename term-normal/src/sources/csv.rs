//! CSV file source.

use super::{relation_from_batches, RelationSource};
use crate::prelude::*;
use crate::relation::Relation;
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use std::path::Path;
use tracing::{debug, instrument};

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first line holds column names
    pub has_header: bool,
    /// Field delimiter
    pub delimiter: u8,
    /// Rewrite column names with [`standardize_name`](crate::relation::standardize_name)
    pub standardize_names: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            standardize_names: false,
        }
    }
}

/// A CSV file read through DataFusion.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a source for `path` with default options.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a source for `path` with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(TermError::Configuration(
                "CSV path must not be empty".to_string(),
            ));
        }
        Ok(Self { path, options })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

#[async_trait]
impl RelationSource for CsvSource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<Relation> {
        if !Path::new(&self.path).is_file() {
            return Err(TermError::data_source(
                "csv",
                format!("file not found: {}", self.path),
            ));
        }

        let extension = Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let read_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .file_extension(&extension);

        let ctx = SessionContext::new();
        let df = ctx
            .read_csv(self.path.as_str(), read_options)
            .await
            .with_context(|| format!("Failed to read CSV file {}", self.path))?;
        let schema = df.schema().inner().clone();
        let batches = df
            .collect()
            .await
            .with_context(|| format!("Failed to parse CSV file {}", self.path))?;

        let relation = relation_from_batches(&schema, &batches)?;
        debug!(
            rows = relation.row_count(),
            attributes = relation.width(),
            "Loaded CSV"
        );

        if self.options.standardize_names {
            let (relation, _) = relation.with_standardized_names()?;
            Ok(relation)
        } else {
            Ok(relation)
        }
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path)
    }
}
