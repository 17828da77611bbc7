//! Terminal and JSON rendering for command results.

use std::io::{self, Write};

use pk_tracker_core::{
    DatasetStats, DrugRecord, FieldValue, MilestoneEvent, PkField, ScoredRecord,
};
use pk_tracker_research::UpdateOutcome;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let mut stdout = io::stdout();
    stdout.write_all(json.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}

pub fn format_status(stats: &DatasetStats, milestones: &[MilestoneEvent]) -> String {
    let line = |label: &str, count: usize| {
        format!("  {:<24}{:>6} ({:.1}%)\n", label, count, stats.percent(count))
    };

    let mut text = format!("Total drugs: {}\n", stats.total);
    text.push_str(&line("Any Cmax", stats.with_any_cmax));
    text.push_str(&line("Oral Cmax", stats.with_oral_cmax));
    text.push_str(&line("IV Cmax", stats.with_iv_cmax));
    text.push_str(&line("Topical Cmax", stats.with_topical_cmax));
    text.push_str(&line("Half-life", stats.with_half_life));
    text.push_str(&line("Tmax and AUC", stats.with_timing_data));
    text.push_str(&line("Therapeutic range", stats.with_therapeutic_range));
    text.push_str(&line("Complete PK profile", stats.with_complete_pk_profile));

    for event in milestones {
        text.push_str(&format!("Milestone: {}\n", event.message));
    }
    text
}

/// One-line summary used by `next` and `queue`.
pub fn format_candidate(candidate: &ScoredRecord) -> String {
    format!(
        "{} (id {}): {}% complete, {} missing",
        candidate.record.drug_name,
        candidate.record.id,
        candidate.completion_score(),
        candidate.score.missing_field_count
    )
}

pub fn format_queue(queue: &[ScoredRecord]) -> String {
    let mut text = String::new();
    for (rank, candidate) in queue.iter().enumerate() {
        text.push_str(&format!("{:>3}. {}\n", rank + 1, format_candidate(candidate)));
    }
    text
}

/// Full record detail for `show`.
pub fn format_record(scored: &ScoredRecord) -> String {
    let mut text = format!("{}\n", format_candidate(scored));
    for field in PkField::ALL {
        let value = match scored.record.value(field) {
            Some(FieldValue::Number(n)) => n.to_string(),
            Some(FieldValue::Text(s)) => format!("{:?}", s),
            None => "-".to_string(),
        };
        text.push_str(&format!("  {:<26}{}\n", field.column(), value));
    }
    if !scored.missing_fields.is_empty() {
        text.push_str(&format!("Missing: {}\n", scored.missing_fields.join(", ")));
    }
    text
}

/// Name and id per line, for `missing`.
pub fn format_missing(drugs: &[DrugRecord]) -> String {
    let mut text = String::new();
    for drug in drugs {
        text.push_str(&format!("{} (id {})\n", drug.drug_name, drug.id));
    }
    text.push_str(&format!("{} records\n", drugs.len()));
    text
}

pub fn format_update(outcome: &UpdateOutcome) -> String {
    let mut text = format!(
        "Updated {}: {}% -> {}%\n",
        outcome.record.drug_name,
        outcome.previous_score.completion_score,
        outcome.new_score.completion_score
    );
    if !outcome.derived_fields.is_empty() {
        let names: Vec<&str> = outcome.derived_fields.iter().map(|f| f.column()).collect();
        text.push_str(&format!("Derived: {}\n", names.join(", ")));
    }
    text
}
