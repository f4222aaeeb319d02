//! Result aggregation
//!
//! Merges rule outputs into the final title list: rule declaration order,
//! first occurrence kept, later duplicates dropped.

use std::collections::HashSet;

use reel_core::{unjoin_title, MatchResult};

/// Collapse match results into distinct titles, keeping first-seen order
pub fn aggregate(results: &[MatchResult]) -> Vec<String> {
    dedup_stable(results.iter().map(|r| unjoin_title(&r.extracted_text)))
}

/// Stable de-duplication by exact string equality
pub fn dedup_stable<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
