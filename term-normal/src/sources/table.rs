//! Source reading a table registered in a DataFusion session.

use super::{relation_from_batches, RelationSource};
use crate::prelude::*;
use crate::relation::Relation;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt;
use tracing::instrument;

/// A table already registered in `ctx`, for example a `MemTable` or a
/// listing table over Parquet files.
#[derive(Clone)]
pub struct TableSource {
    ctx: SessionContext,
    table: String,
}

impl TableSource {
    pub fn new(ctx: SessionContext, table: impl Into<String>) -> Self {
        Self {
            ctx,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Debug for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSource")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RelationSource for TableSource {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn load(&self) -> Result<Relation> {
        let df = self.ctx.table(self.table.as_str()).await.map_err(|e| {
            TermError::data_source_with_source(
                "table",
                format!("cannot read table '{}'", self.table),
                Box::new(e),
            )
        })?;
        let schema = df.schema().inner().clone();
        let batches = df
            .collect()
            .await
            .with_context(|| format!("Failed to collect table '{}'", self.table))?;
        relation_from_batches(&schema, &batches)
    }

    fn description(&self) -> String {
        format!("DataFusion table: {}", self.table)
    }
}
