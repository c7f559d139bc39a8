//! Overlap and duplicate resolution
//!
//! Two passes live here. [`remove_duplicates`] is the per-entity-type
//! containment dedup run after every scan and again over the merged output
//! of all recognizers. [`resolve_conflicts`] is the stricter non-overlap
//! selection the anonymizer runs defensively before splicing, where spans of
//! *different* entity types must not collide either.

use crate::analyzer::models::RecognizerResult;

/// Sort key: best score first, then longest span, then leftmost
fn by_priority(a: &RecognizerResult, b: &RecognizerResult) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(b.len().cmp(&a.len()))
        .then(a.start.cmp(&b.start))
}

/// Drop results fully covered by an already-kept result of the same entity
/// type with a higher-or-equal score
///
/// Greedy interval scan over results sorted by score then span length;
/// identical `(start, end, entity_type)` duplicates collapse to one. The
/// pass is idempotent: running it on its own output changes nothing.
pub fn remove_duplicates(results: Vec<RecognizerResult>) -> Vec<RecognizerResult> {
    let mut sorted = results;
    sorted.sort_by(by_priority);

    let mut kept: Vec<RecognizerResult> = Vec::with_capacity(sorted.len());
    for result in sorted {
        let redundant = kept.iter().any(|k| {
            k.entity_type == result.entity_type && k.contains(&result) && k.score >= result.score
        });
        if redundant {
            tracing::debug!(
                entity_type = %result.entity_type,
                start = result.start,
                end = result.end,
                "dropping duplicate result"
            );
        } else {
            kept.push(result);
        }
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    kept
}

/// Reduce to a conflict-free set: no two kept spans overlap at all,
/// regardless of entity type
///
/// Higher-scored (then longer) spans win. Used by the anonymizer so a
/// caller handing in raw, unresolved results can never corrupt the splice
/// order.
pub fn resolve_conflicts(results: Vec<RecognizerResult>) -> Vec<RecognizerResult> {
    let mut sorted = results;
    sorted.sort_by(by_priority);

    let mut kept: Vec<RecognizerResult> = Vec::with_capacity(sorted.len());
    for result in sorted {
        if kept.iter().any(|k| k.overlaps(&result)) {
            tracing::debug!(
                entity_type = %result.entity_type,
                start = result.start,
                end = result.end,
                "dropping overlapping result before anonymization"
            );
        } else {
            kept.push(result);
        }
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start));
    kept
}
