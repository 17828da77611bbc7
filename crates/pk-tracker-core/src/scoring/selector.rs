//! Research candidate selection.
//!
//! Eligible records have `0 < score < 80`. They are ordered least complete
//! first; equal scores prefer the record with more missing fields. The sort
//! is stable, so remaining ties keep the order the store returned.

use std::cmp::Ordering;

use crate::models::DrugRecord;

use super::{RecordScore, ScoredRecord};

/// Scores at or below this are "not started" and never selected.
pub const MIN_EXCLUSIVE_SCORE: u8 = 0;

/// Scores at or above this are adequately complete.
pub const ADEQUATE_SCORE: u8 = 80;

/// Whether a score falls inside the research window.
pub fn is_eligible(score: &RecordScore) -> bool {
    score.completion_score > MIN_EXCLUSIVE_SCORE && score.completion_score < ADEQUATE_SCORE
}

/// Ordering used to rank candidates: ascending score, then descending
/// missing-field count.
pub fn compare_scores(a: &RecordScore, b: &RecordScore) -> Ordering {
    a.completion_score
        .cmp(&b.completion_score)
        .then_with(|| b.missing_field_count.cmp(&a.missing_field_count))
}

/// All eligible records, best candidate first.
pub fn rank_candidates<I>(records: I) -> Vec<ScoredRecord>
where
    I: IntoIterator<Item = DrugRecord>,
{
    let mut eligible: Vec<ScoredRecord> = records
        .into_iter()
        .map(ScoredRecord::new)
        .filter(|scored| is_eligible(&scored.score))
        .collect();

    eligible.sort_by(|a, b| compare_scores(&a.score, &b.score));
    eligible
}

/// The single best research candidate, or `None` when nothing qualifies.
///
/// `None` is a normal terminal state: every record is either untouched or
/// adequately complete.
pub fn select_candidate<I>(records: I) -> Option<ScoredRecord>
where
    I: IntoIterator<Item = DrugRecord>,
{
    rank_candidates(records).into_iter().next()
}
