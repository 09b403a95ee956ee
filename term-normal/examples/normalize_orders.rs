//! Normalizes a small denormalized orders table and prints the report.
//!
//! Run with `cargo run --example normalize_orders`.

use term_normal::core::{Normalizer, NormalizerConfig};
use term_normal::discovery::DiscoveryConfig;
use term_normal::logging::setup::{init_logging, LoggingConfig};
use term_normal::relation::{Relation, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let rows = [
        (1, "ann", "oslo", "norway", "widget"),
        (2, "ann", "oslo", "norway", "gadget"),
        (3, "bob", "rome", "italy", "widget"),
        (4, "cid", "rome", "italy", "gizmo"),
        (5, "dee", "bergen", "norway", "gadget"),
        (6, "dee", "bergen", "norway", "widget"),
    ];
    let relation = Relation::new(
        ["Order Id", "Customer", "City", "Country", "Product"],
        rows.iter()
            .map(|(id, customer, city, country, product)| {
                vec![
                    Value::from(*id),
                    Value::from(*customer),
                    Value::from(*city),
                    Value::from(*country),
                    Value::from(*product),
                ]
            })
            .collect(),
    )?;
    let (relation, renames) = relation.with_standardized_names()?;
    for (old, new) in &renames {
        println!("renamed {old:?} -> {new:?}");
    }

    let normalizer =
        Normalizer::new(NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()));
    let report = normalizer.run(&relation)?;

    println!("primary key: {}", report.primary_key.join(", "));
    for schema in &report.schemas {
        println!(
            "{}({}) key [{}]",
            schema.name,
            schema.attributes.join(", "),
            schema.key.join(", ")
        );
    }
    for fk in &report.foreign_keys {
        println!("{} -> {} on [{}]", fk.from, fk.to, fk.attributes.join(", "));
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    Ok(())
}
