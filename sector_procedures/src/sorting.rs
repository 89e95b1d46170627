use itertools::Itertools;
use regex::Regex;

use crate::resolver::ResolvedProcedure;

/// Keeps the first procedure for every `(icao, display_id, waypoints)`.
pub fn remove_duplicate_procedures(procedures: Vec<ResolvedProcedure>) -> Vec<ResolvedProcedure> {
    procedures
        .into_iter()
        .unique_by(ResolvedProcedure::dedup_key)
        .collect()
}

/// Orders procedures by the first name pattern matching their full id, then
/// alphabetically inside each bucket. Unmatched procedures go last.
pub fn sort_procedures(
    procedures: Vec<ResolvedProcedure>,
    name_sort_order: &[Regex],
) -> Vec<ResolvedProcedure> {
    let uncategorized = name_sort_order.len();
    let mut buckets = vec![Vec::new(); uncategorized + 1];
    for procedure in procedures {
        let bucket = name_sort_order
            .iter()
            .position(|pattern| pattern.is_match(&procedure.full_id))
            .unwrap_or(uncategorized);
        buckets[bucket].push(procedure);
    }

    buckets
        .into_iter()
        .flat_map(|bucket| {
            bucket
                .into_iter()
                .sorted_by(|a, b| a.full_id.cmp(&b.full_id))
        })
        .collect()
}
