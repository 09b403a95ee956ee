//! End-to-end scenarios for discovery and normalization.

#[cfg(feature = "test-utils")]
mod tests {
    use std::time::{Duration, Instant};
    use term_normal::core::{Normalizer, NormalizerConfig};
    use term_normal::discovery::{
        DegenerateReason, DiscoveryConfig, DiscoveryStatus, FdDiscovery, PartialReason,
    };
    use term_normal::partition::ErrorMeasure;
    use term_normal::prelude::*;
    use term_normal::relation::{AttributeSet, Relation, Value};
    use term_normal::test_fixtures::{
        chain, enrollment, enrollment_with_constant, noisy_pairs, random_relation,
    };

    fn exact_normalizer() -> Normalizer {
        Normalizer::new(NormalizerConfig::default().with_discovery(DiscoveryConfig::exact()))
    }

    #[test]
    fn test_enrollment_is_split_into_course_and_enrollment() {
        let relation = enrollment();
        let normalization = exact_normalizer().normalize(&relation).unwrap();
        let schema = &normalization.schema;

        assert_eq!(
            normalization.cover.display(schema),
            vec!["{course_id} -> course_name", "{course_id} -> instructor"]
        );
        assert_eq!(normalization.keys.display(schema), vec!["{course_id, student_id}"]);

        let schemas: Vec<(String, String)> = normalization
            .decomposition
            .schemas
            .iter()
            .map(|s| (schema.display_set(&s.attributes), schema.display_set(&s.key)))
            .collect();
        assert_eq!(
            schemas,
            vec![
                (
                    "{course_id, course_name, instructor}".to_string(),
                    "{course_id}".to_string()
                ),
                (
                    "{course_id, student_id}".to_string(),
                    "{course_id, student_id}".to_string()
                ),
            ]
        );

        let report = normalization.report();
        assert_eq!(report.foreign_keys.len(), 1);
        assert_eq!(report.foreign_keys[0].from, "course_id_student_id");
        assert_eq!(report.foreign_keys[0].to, "course_id");
        assert_eq!(report.foreign_keys[0].attributes, vec!["course_id"]);

        let rebuilt = normalization.decomposition.reconstruct(&relation).unwrap();
        assert!(rebuilt.same_rows_as(&relation));
    }

    #[test]
    fn test_constant_column_never_on_left_hand_side() {
        let relation = enrollment_with_constant();
        let normalization = exact_normalizer().normalize(&relation).unwrap();
        let campus = relation.schema().position("campus").unwrap();

        assert!(normalization.discovery.constant_attributes.contains(campus));
        assert!(normalization
            .discovery
            .dependencies
            .iter()
            .all(|fd| !fd.lhs.contains(campus) && fd.rhs != campus));
        assert_eq!(normalization.report().constant_attributes, vec!["campus"]);
        assert_eq!(normalization.profile.constant_attributes.len(), 1);

        // the constant lands with the key
        assert!(normalization.keys.primary.contains(campus));
        assert!(normalization
            .decomposition
            .schemas
            .iter()
            .any(|s| s.attributes.contains(campus) && s.key == normalization.keys.primary));
    }

    #[test]
    fn test_approximate_dependency_support() {
        let relation = noisy_pairs(100, 4);
        let x = AttributeSet::singleton(0);

        let tolerant = FdDiscovery::builder()
            .error_tolerance(0.05)
            .build()
            .discover(&relation)
            .unwrap();
        let fd = tolerant.get(&x, 1).expect("x -> a within 5%");
        assert!((fd.support - 0.96).abs() < 1e-9);

        let strict = FdDiscovery::builder()
            .error_tolerance(0.02)
            .build()
            .discover(&relation)
            .unwrap();
        assert!(strict.get(&x, 1).is_none());
    }

    #[test]
    fn test_g3_counts_fewer_error_rows() {
        // two split pairs: row ratio counts 4 rows, g3 counts 2
        let relation = noisy_pairs(100, 4);
        let x = AttributeSet::singleton(0);
        let g3 = FdDiscovery::builder()
            .error_tolerance(0.02)
            .error_measure(ErrorMeasure::G3)
            .build()
            .discover(&relation)
            .unwrap();
        let fd = g3.get(&x, 1).expect("x -> a within 2% under g3");
        assert!((fd.support - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_relations_flagged() {
        let empty = Relation::new(["a", "b"], vec![]).unwrap();
        let result = FdDiscovery::default().discover(&empty).unwrap();
        assert_eq!(
            result.status,
            DiscoveryStatus::Degenerate {
                reason: DegenerateReason::EmptyRelation
            }
        );

        let single = Relation::new(["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]]).unwrap();
        let report = exact_normalizer().run(&single).unwrap();
        assert_eq!(
            report.status,
            DiscoveryStatus::Degenerate {
                reason: DegenerateReason::SingleRow
            }
        );
        assert_eq!(report.schemas.len(), 1);
        assert_eq!(report.schemas[0].attributes, vec!["a", "b"]);
    }

    #[test]
    fn test_size_limit_rejected_before_search() {
        let attributes: Vec<String> = (0..30).map(|i| format!("c{i}")).collect();
        let rows = vec![(0..30).map(Value::Int).collect(); 2];
        let relation = Relation::new(attributes, rows).unwrap();

        let err = FdDiscovery::default().discover(&relation).unwrap_err();
        assert!(matches!(
            err,
            TermError::SizeLimitExceeded {
                attributes: 30,
                limit: 24
            }
        ));
    }

    #[test]
    fn test_partial_results_are_tagged() {
        let relation = enrollment();
        let result = FdDiscovery::builder()
            .error_tolerance(0.0)
            .max_lattice_level(1)
            .build()
            .discover(&relation)
            .unwrap();
        assert!(result.is_partial());
        assert_eq!(result.stats.levels_completed, 1);
        // level one already finds the course dependencies
        assert_eq!(result.dependencies.len(), 2);

        let budgeted = FdDiscovery::builder()
            .error_tolerance(0.0)
            .row_budget(1)
            .build()
            .discover(&relation)
            .unwrap();
        assert!(matches!(
            budgeted.status,
            DiscoveryStatus::Partial {
                reason: PartialReason::RowBudget { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_generous_deadline_completes() {
        let result = FdDiscovery::builder()
            .error_tolerance(0.0)
            .deadline(Duration::from_secs(60))
            .build()
            .discover(&chain(500, 20))
            .unwrap();
        assert!(result.is_complete());
    }

    #[test]
    fn test_chain_decomposes_transitively() {
        let relation = chain(120, 12);
        let report = exact_normalizer().run(&relation).unwrap();
        let cover: Vec<String> = report
            .cover
            .iter()
            .map(|fd| format!("{} -> {}", fd.lhs.join(","), fd.rhs))
            .collect();
        assert_eq!(cover, vec!["id -> group", "group -> label"]);
        assert_eq!(report.primary_key, vec!["id"]);
        assert_eq!(report.schemas.len(), 2);
    }

    #[test]
    fn test_wide_random_relation_normalizes_quickly() {
        // low cardinality over many columns yields a large cover with many schemas
        let relation = random_relation(200, 12, 4, 1);
        let started = Instant::now();
        let normalization = exact_normalizer().normalize(&relation).unwrap();
        let elapsed = started.elapsed();

        assert!(!normalization.cover.is_empty());
        assert!(normalization.decomposition.is_dependency_preserving());
        assert!(
            elapsed < Duration::from_secs(30),
            "normalization took {elapsed:?}"
        );
    }
}
