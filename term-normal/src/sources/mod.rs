//! Adapters that load a [`Relation`] from Arrow data.
//!
//! Every source goes through [`relation_from_batches`], which maps Arrow
//! columns onto [`Value`]s. DataFusion does the reading, so a table already
//! registered in a `SessionContext` and a CSV file on disk load the same way.
//!
//! ```rust,ignore
//! use term_normal::sources::{CsvSource, RelationSource};
//!
//! # async fn example() -> term_normal::prelude::Result<()> {
//! let relation = CsvSource::new("data/enrollment.csv")?.load().await?;
//! println!("{} rows", relation.row_count());
//! # Ok(())
//! # }
//! ```

use crate::prelude::*;
use crate::relation::{Relation, Value};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, LargeStringArray, StringArray, StringViewArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use async_trait::async_trait;
use std::fmt::Debug;

mod csv;
mod table;

pub use csv::{CsvOptions, CsvSource};
pub use table::TableSource;

/// Something a relation instance can be loaded from.
#[async_trait]
pub trait RelationSource: Debug + Send + Sync {
    /// Reads the whole source into memory.
    async fn load(&self) -> Result<Relation>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}

/// Builds a relation from record batches sharing `schema`.
///
/// Booleans, integers, floats and the three UTF-8 layouts map onto their
/// [`Value`] variants, nulls onto [`Value::Null`]. Unsigned 64-bit values
/// beyond `i64::MAX` and every other Arrow type are kept as their display text.
pub fn relation_from_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Relation> {
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let total: usize = batches.iter().map(RecordBatch::num_rows).sum();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(total);

    for batch in batches {
        if batch.num_columns() != names.len() {
            return Err(TermError::input_shape(format!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                names.len()
            )));
        }
        let columns = batch
            .columns()
            .iter()
            .map(column_values)
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|column| column[row].clone()).collect());
        }
    }

    Relation::new(names, rows)
}

fn column_values(array: &ArrayRef) -> Result<Vec<Value>> {
    match array.data_type() {
        DataType::Boolean => convert::<BooleanArray>(array, |a, i| Value::Bool(a.value(i))),
        DataType::Int8 => convert::<Int8Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::Int16 => convert::<Int16Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::Int32 => convert::<Int32Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::Int64 => convert::<Int64Array>(array, |a, i| Value::Int(a.value(i))),
        DataType::UInt8 => convert::<UInt8Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::UInt16 => convert::<UInt16Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::UInt32 => convert::<UInt32Array>(array, |a, i| Value::Int(a.value(i).into())),
        DataType::UInt64 => convert::<UInt64Array>(array, |a, i| {
            let value = a.value(i);
            i64::try_from(value)
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Text(value.to_string()))
        }),
        DataType::Float32 => {
            convert::<Float32Array>(array, |a, i| Value::Float(f64::from(a.value(i))))
        }
        DataType::Float64 => convert::<Float64Array>(array, |a, i| Value::Float(a.value(i))),
        DataType::Utf8 => convert::<StringArray>(array, |a, i| Value::Text(a.value(i).to_string())),
        DataType::LargeUtf8 => {
            convert::<LargeStringArray>(array, |a, i| Value::Text(a.value(i).to_string()))
        }
        DataType::Utf8View => {
            convert::<StringViewArray>(array, |a, i| Value::Text(a.value(i).to_string()))
        }
        _ => (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Text(array_value_to_string(array, i)?))
                }
            })
            .collect(),
    }
}

fn convert<A: Array + 'static>(
    array: &ArrayRef,
    value: impl Fn(&A, usize) -> Value,
) -> Result<Vec<Value>> {
    let typed = array.as_any().downcast_ref::<A>().ok_or_else(|| {
        TermError::Internal(format!(
            "array of type {} failed to downcast",
            array.data_type()
        ))
    })?;
    Ok((0..typed.len())
        .map(|i| {
            if typed.is_null(i) {
                Value::Null
            } else {
                value(typed, i)
            }
        })
        .collect())
}
