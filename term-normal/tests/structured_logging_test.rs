//! Integration tests for structured logging functionality.

use term_normal::core::{Normalizer, NormalizerConfig};
use term_normal::discovery::{DiscoveryConfig, FdDiscovery};
use term_normal::logging::LogConfig;
use term_normal::relation::{Relation, Value};

/// Test helper to capture structured logs
struct LogCapture {
    logs: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl LogCapture {
    fn new() -> Self {
        Self {
            logs: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    fn captured_logs(&self) -> String {
        self.logs.lock().unwrap().join("")
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let s = String::from_utf8_lossy(buf).to_string();
        self.logs.lock().unwrap().push(s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn json_subscriber(capture: &LogCapture, filter: &str) -> impl tracing::Subscriber {
    let logs = capture.logs.clone();
    tracing_subscriber::fmt()
        .json()
        .with_writer(move || LogCapture { logs: logs.clone() })
        .with_env_filter(filter)
        .finish()
}

fn orders() -> Relation {
    let rows = [
        (1, "ann", "oslo", "eu"),
        (2, "ann", "oslo", "eu"),
        (3, "bob", "rome", "eu"),
        (4, "cid", "rome", "eu"),
    ];
    Relation::new(
        ["order_id", "customer", "city", "region"],
        rows.iter()
            .map(|(id, customer, city, region)| {
                vec![
                    Value::from(*id),
                    Value::from(*customer),
                    Value::from(*city),
                    Value::from(*region),
                ]
            })
            .collect(),
    )
    .unwrap()
}

/// `c = a xor b`, so the only dependencies sit on the second level.
fn xor() -> Relation {
    let rows = (0..8)
        .map(|i| {
            let (a, b) = (i % 2, (i / 2) % 2);
            vec![Value::Int(a), Value::Int(b), Value::Int(a ^ b)]
        })
        .collect();
    Relation::new(["a", "b", "c"], rows).unwrap()
}

#[test]
fn test_discovery_summary_fields() {
    let capture = LogCapture::new();
    let _guard = tracing::subscriber::set_default(json_subscriber(&capture, "info"));

    FdDiscovery::builder()
        .error_tolerance(0.0)
        .workers(1)
        .build()
        .discover(&orders())
        .unwrap();

    let logs = capture.captured_logs();
    assert!(logs.contains(r#""level":"INFO""#), "Should contain log level");
    assert!(
        logs.contains(r#""message":"Excluding constant attributes from the search""#),
        "Should report the constant region column"
    );
    assert!(
        logs.contains(r#""message":"Discovery finished""#),
        "Should contain completion message"
    );
    assert!(logs.contains(r#""dependencies":"#), "Should record the dependency count");
}

#[test]
fn test_lattice_details_are_opt_in() {
    let quiet = LogCapture::new();
    {
        let _guard = tracing::subscriber::set_default(json_subscriber(&quiet, "debug"));
        FdDiscovery::builder()
            .error_tolerance(0.0)
            .workers(1)
            .log_config(LogConfig::production())
            .build()
            .discover(&orders())
            .unwrap();
    }
    assert!(!quiet.captured_logs().contains("Evaluated lattice node"));

    let verbose = LogCapture::new();
    {
        let _guard = tracing::subscriber::set_default(json_subscriber(&verbose, "debug"));
        FdDiscovery::builder()
            .error_tolerance(0.0)
            .workers(1)
            .log_config(LogConfig::verbose())
            .build()
            .discover(&orders())
            .unwrap();
    }
    let logs = verbose.captured_logs();
    assert!(logs.contains(r#""message":"Evaluated lattice node""#));
    assert!(logs.contains(r#""message":"Evaluated lattice level""#));
    assert!(logs.contains(r#""level":"DEBUG""#));
}

#[test]
fn test_partial_normalization_warns() {
    let capture = LogCapture::new();
    let _guard = tracing::subscriber::set_default(json_subscriber(&capture, "warn"));

    let config = NormalizerConfig::default()
        .with_discovery(DiscoveryConfig {
            max_lattice_level: Some(1),
            workers: 1,
            ..DiscoveryConfig::exact()
        })
        .allow_partial(true);
    Normalizer::new(config).run(&xor()).unwrap();

    let logs = capture.captured_logs();
    assert!(logs.contains(r#""level":"WARN""#));
    assert!(logs.contains(r#""message":"Normalizing on a partial dependency set""#));
    assert!(!logs.contains(r#""level":"INFO""#), "Filter should drop info logs");
}

#[test]
fn test_worker_events_reach_the_caller_subscriber() {
    let capture = LogCapture::new();
    let result = {
        let _guard = tracing::subscriber::set_default(json_subscriber(&capture, "debug"));
        FdDiscovery::builder()
            .error_tolerance(0.0)
            .workers(2)
            .log_config(LogConfig::verbose())
            .build()
            .discover(&orders())
            .unwrap()
    };

    let logs = capture.captured_logs();
    let node_events: Vec<&str> = logs
        .lines()
        .filter(|line| line.contains(r#""message":"Evaluated lattice node""#))
        .collect();
    assert_eq!(node_events.len(), result.stats.nodes_evaluated);
    assert!(node_events
        .iter()
        .all(|line| line.contains(r#""name":"discover""#)));
}
