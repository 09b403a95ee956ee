//! Attribute name standardization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\s+").expect("Hard-coded regex pattern should be valid")
});

static NON_WORD: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^\w]").expect("Hard-coded regex pattern should be valid")
});

/// Normalizes one attribute name: lowercase, trimmed, whitespace runs
/// collapsed to `_`, and every non-word character removed.
///
/// ```rust
/// use term_normal::relation::standardize_name;
///
/// assert_eq!(standardize_name("  Course Name "), "course_name");
/// assert_eq!(standardize_name("Price ($)"), "price_");
/// ```
pub fn standardize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let underscored = WHITESPACE.replace_all(lowered.trim(), "_");
    NON_WORD.replace_all(&underscored, "").into_owned()
}

/// Standardizes a full attribute list, suffixing `_1`, `_2`, ... onto names
/// that collide with an earlier one.
///
/// Returns the new names (same order) and the `(old, new)` pairs that changed.
pub(crate) fn standardize_names(names: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut taken: HashSet<String> = HashSet::new();
    let mut standardized = Vec::with_capacity(names.len());
    let mut renames = Vec::new();

    for original in names {
        let base = standardize_name(original);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());

        if &candidate != original {
            renames.push((original.clone(), candidate.clone()));
        }
        standardized.push(candidate);
    }

    (standardized, renames)
}
