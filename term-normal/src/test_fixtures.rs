//! Common relations for discovery and normalization tests.
//!
//! Each fixture is built so the dependencies that hold on it are known in
//! advance. The random generator is seeded and therefore reproducible.

use crate::relation::{Relation, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Student enrollments where `course_id` determines `course_name` and
/// `instructor` and nothing else holds.
///
/// Every course has at least two students, students take courses of mixed
/// names and instructors, and `c1`/`c5` share name and instructor, so no
/// other left-hand side survives.
pub fn enrollment() -> Relation {
    let rows = [
        (1, "c1", "databases", "codd"),
        (1, "c5", "databases", "codd"),
        (1, "c3", "compilers", "codd"),
        (2, "c1", "databases", "codd"),
        (2, "c2", "databases", "date"),
        (2, "c3", "compilers", "codd"),
        (3, "c2", "databases", "date"),
        (3, "c4", "compilers", "date"),
        (3, "c5", "databases", "codd"),
        (4, "c4", "compilers", "date"),
    ];
    build(
        &["student_id", "course_id", "course_name", "instructor"],
        rows.iter()
            .map(|(student, course, name, instructor)| {
                vec![
                    Value::from(*student),
                    Value::from(*course),
                    Value::from(*name),
                    Value::from(*instructor),
                ]
            })
            .collect(),
    )
}

/// [`enrollment`] plus a `campus` column holding the same value on every row.
pub fn enrollment_with_constant() -> Relation {
    let base = enrollment();
    let mut attributes = base.schema().attributes().to_vec();
    attributes.push("campus".to_string());
    let rows = base
        .rows()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.push(Value::from("north"));
            row
        })
        .collect();
    build(&attributes, rows)
}

/// Two columns `x` and `a` where `x -> a` fails on exactly `violating` rows
/// under the row-ratio measure.
///
/// `x` groups rows in pairs. The second row of the first `violating / 2`
/// pairs gets a unique `a` value, so each of those pairs splits.
pub fn noisy_pairs(rows: usize, violating: usize) -> Relation {
    let broken_pairs = violating / 2;
    let data = (0..rows)
        .map(|row| {
            let x = (row / 2) as i64;
            let a = if row % 2 == 1 && (row / 2) < broken_pairs {
                1_000 + row as i64
            } else {
                x % 7
            };
            vec![Value::Int(x), Value::Int(a)]
        })
        .collect();
    build(&["x", "a"], data)
}

/// `id -> group -> label`, with `rows` rows and `groups` groups.
pub fn chain(rows: usize, groups: usize) -> Relation {
    let groups = groups.max(1);
    let data = (0..rows)
        .map(|row| {
            let group = (row % groups) as i64;
            vec![
                Value::Int(row as i64),
                Value::Int(group),
                Value::Text(format!("label-{}", group % 3)),
            ]
        })
        .collect();
    build(&["id", "group", "label"], data)
}

/// Uniformly random integers in `0..cardinality`, reproducible from `seed`.
pub fn random_relation(rows: usize, width: usize, cardinality: i64, seed: u64) -> Relation {
    let mut rng = StdRng::seed_from_u64(seed);
    let attributes: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
    let data = (0..rows)
        .map(|_| {
            (0..width)
                .map(|_| Value::Int(rng.random_range(0..cardinality.max(1))))
                .collect()
        })
        .collect();
    build(&attributes, data)
}

#[allow(clippy::expect_used)]
fn build<S: AsRef<str>>(attributes: &[S], rows: Vec<Vec<Value>>) -> Relation {
    Relation::new(attributes.iter().map(|a| a.as_ref().to_string()), rows)
        .expect("fixture relations are rectangular")
}
