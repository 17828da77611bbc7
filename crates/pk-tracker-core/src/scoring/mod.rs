//! Completeness scoring for drug records.
//!
//! A record's completion score is the share of the 14 tracked fields that
//! hold a value, as an integer percentage rounded half-up:
//!
//! ```text
//! score = (100 * present + 7) / 14        (integer division)
//! ```
//!
//! `100 * present` is always even, so it is never an odd multiple of 7 and
//! the fraction never lands exactly on .5; this matches `f64::round`.

mod selector;

pub use selector::*;

use serde::{Deserialize, Serialize};

use crate::models::{DrugRecord, PkField, TRACKED_FIELD_COUNT};

/// Number of tracked fields holding a value.
pub fn present_count(record: &DrugRecord) -> usize {
    PkField::TRACKED
        .iter()
        .filter(|field| record.is_present(**field))
        .count()
}

/// Labels of absent tracked fields, in catalog order.
pub fn missing_fields(record: &DrugRecord) -> Vec<&'static str> {
    PkField::TRACKED
        .iter()
        .filter(|field| !record.is_present(**field))
        .filter_map(|field| field.label())
        .collect()
}

pub fn missing_field_count(record: &DrugRecord) -> usize {
    TRACKED_FIELD_COUNT - present_count(record)
}

/// Completion score in 0..=100.
pub fn completion_score(record: &DrugRecord) -> u8 {
    score_for_present(present_count(record))
}

fn score_for_present(present: usize) -> u8 {
    let present = present.min(TRACKED_FIELD_COUNT);
    ((100 * present + TRACKED_FIELD_COUNT / 2) / TRACKED_FIELD_COUNT) as u8
}

/// Score and missing count for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordScore {
    pub completion_score: u8,
    pub missing_field_count: usize,
}

impl RecordScore {
    pub fn of(record: &DrugRecord) -> Self {
        let present = present_count(record);
        Self {
            completion_score: score_for_present(present),
            missing_field_count: TRACKED_FIELD_COUNT - present,
        }
    }
}

/// A record together with its derived completeness data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: DrugRecord,
    pub score: RecordScore,
    pub missing_fields: Vec<&'static str>,
}

impl ScoredRecord {
    pub fn new(record: DrugRecord) -> Self {
        let score = RecordScore::of(&record);
        let missing_fields = missing_fields(&record);
        Self {
            record,
            score,
            missing_fields,
        }
    }

    pub fn completion_score(&self) -> u8 {
        self.score.completion_score
    }
}
