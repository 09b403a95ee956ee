//! Integration tests for relation sources.

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;
use term_normal::core::{Normalizer, NormalizerConfig};
use term_normal::discovery::DiscoveryConfig;
use term_normal::prelude::*;
use term_normal::relation::Value;
use term_normal::sources::{CsvOptions, CsvSource, RelationSource, TableSource};

/// Creates a test directory with order data as CSV and TSV.
fn create_csv_test_data() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut csv = File::create(dir.path().join("orders.csv")).unwrap();
    writeln!(csv, "Order Id,Customer,City").unwrap();
    writeln!(csv, "1,ann,oslo").unwrap();
    writeln!(csv, "2,ann,oslo").unwrap();
    writeln!(csv, "3,bob,rome").unwrap();
    writeln!(csv, "4,cid,rome").unwrap();
    csv.flush().unwrap();

    let mut tsv = File::create(dir.path().join("orders.tsv")).unwrap();
    writeln!(tsv, "order_id\tcustomer\tcity").unwrap();
    writeln!(tsv, "5\teve\tlima").unwrap();
    writeln!(tsv, "6\teve\tlima").unwrap();
    tsv.flush().unwrap();

    dir
}

fn path_of(dir: &TempDir, file: &str) -> String {
    dir.path().join(file).to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_csv_source_loads_typed_values() {
    let dir = create_csv_test_data();
    let source = CsvSource::new(path_of(&dir, "orders.csv")).unwrap();

    let relation = source.load().await.unwrap();
    assert_eq!(relation.schema().attributes(), &["Order Id", "Customer", "City"]);
    assert_eq!(relation.row_count(), 4);
    assert_eq!(relation.value(0, 0), &Value::Int(1));
    assert_eq!(relation.value(2, 1), &Value::from("bob"));
    assert!(source.description().starts_with("CSV file:"));
}

#[tokio::test]
async fn test_csv_source_standardizes_names() {
    let dir = create_csv_test_data();
    let options = CsvOptions {
        standardize_names: true,
        ..Default::default()
    };
    let source = CsvSource::with_options(path_of(&dir, "orders.csv"), options).unwrap();

    let relation = source.load().await.unwrap();
    assert_eq!(relation.schema().attributes(), &["order_id", "customer", "city"]);
}

#[tokio::test]
async fn test_tsv_with_custom_delimiter() {
    let dir = create_csv_test_data();
    let options = CsvOptions {
        delimiter: b'\t',
        ..Default::default()
    };
    let source = CsvSource::with_options(path_of(&dir, "orders.tsv"), options).unwrap();

    let relation = source.load().await.unwrap();
    assert_eq!(relation.width(), 3);
    assert_eq!(relation.row_count(), 2);
    assert_eq!(relation.value(1, 2), &Value::from("lima"));
}

#[tokio::test]
async fn test_missing_csv_is_a_data_source_error() {
    let source = CsvSource::new("/nonexistent/orders.csv").unwrap();
    match source.load().await {
        Err(TermError::DataSource { source_type, .. }) => assert_eq!(source_type, "csv"),
        other => panic!("expected data source error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_csv_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let mut csv = File::create(dir.path().join("ragged.csv")).unwrap();
    writeln!(csv, "a,b").unwrap();
    writeln!(csv, "1,2").unwrap();
    writeln!(csv, "3,4,5").unwrap();
    csv.flush().unwrap();

    let source = CsvSource::new(path_of(&dir, "ragged.csv")).unwrap();
    match source.load().await {
        Err(TermError::Internal(message)) => {
            assert!(message.contains("ragged.csv"), "{message}");
        }
        other => panic!("expected contextual error, got {other:?}"),
    }
}

#[test]
fn test_empty_csv_path_rejected() {
    assert!(matches!(
        CsvSource::new(""),
        Err(TermError::Configuration(_))
    ));
}

fn register_orders(ctx: &SessionContext) {
    let schema = Arc::new(ArrowSchema::new(vec![
        Field::new("order_id", DataType::Int64, false),
        Field::new("customer", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
            Arc::new(StringArray::from(vec!["ann", "ann", "bob", "cid"])),
            Arc::new(StringArray::from(vec![
                Some("oslo"),
                Some("oslo"),
                None,
                None,
            ])),
        ],
    )
    .unwrap();
    let table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    ctx.register_table("orders", Arc::new(table)).unwrap();
}

#[tokio::test]
async fn test_table_source_reads_registered_table() {
    let ctx = SessionContext::new();
    register_orders(&ctx);

    let source = TableSource::new(ctx, "orders");
    let relation = source.load().await.unwrap();
    assert_eq!(relation.row_count(), 4);
    assert_eq!(relation.value(2, 2), &Value::Null);
    assert_eq!(source.description(), "DataFusion table: orders");
}

#[tokio::test]
async fn test_table_source_unknown_table() {
    let source = TableSource::new(SessionContext::new(), "missing");
    assert!(matches!(
        source.load().await,
        Err(TermError::DataSource { .. })
    ));
}

#[tokio::test]
async fn test_loaded_table_normalizes() {
    let ctx = SessionContext::new();
    register_orders(&ctx);
    let relation = TableSource::new(ctx, "orders").load().await.unwrap();

    // nulls compare equal, so customer -> city holds
    let report = Normalizer::new(NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()))
        .run(&relation)
        .unwrap();
    assert_eq!(report.primary_key, vec!["order_id"]);
    assert!(report
        .cover
        .iter()
        .any(|fd| fd.lhs == vec!["customer"] && fd.rhs == "city"));
}
