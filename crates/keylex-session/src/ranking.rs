//! Candidate accumulation shared by `spell` and `suggest`.

use std::cmp::Ordering;

use crate::types::{
    SuggestionCandidate, SUGGESTION_CANDIDATE_MAX_CONFIDENCE,
    SUGGESTION_CANDIDATE_MIN_CONFIDENCE,
};

/// Fold one fuzzy-search emission into the running result list.
///
/// A candidate with identical text is merged first (minimum edit distance,
/// maximum confidence). The list is then re-sorted by edit distance
/// ascending, ties broken by confidence descending, and trimmed from the
/// tail when it exceeds `max_count`. The sort is stable, so candidates tied
/// on both keys stay in trie traversal order and the result is
/// deterministic.
pub(crate) fn collect_candidate(
    results: &mut Vec<SuggestionCandidate>,
    max_count: usize,
    text: &str,
    edit_distance: u32,
    confidence: f64,
) {
    let mut edit_distance = edit_distance;
    let mut confidence = confidence.clamp(
        SUGGESTION_CANDIDATE_MIN_CONFIDENCE,
        SUGGESTION_CANDIDATE_MAX_CONFIDENCE,
    );

    if let Some(index) = results.iter().position(|c| c.text == text) {
        let existing = results.remove(index);
        edit_distance = edit_distance.min(existing.edit_distance);
        confidence = confidence.max(existing.confidence);
    }

    results.push(SuggestionCandidate::new(text, edit_distance, confidence));
    results.sort_by(|a, b| {
        a.edit_distance.cmp(&b.edit_distance).then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        })
    });
    if results.len() > max_count {
        results.pop();
    }
}
