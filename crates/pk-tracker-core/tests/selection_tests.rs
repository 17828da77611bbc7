//! End-to-end selection tests against the SQLite store.
//!
//! Each case seeds a fresh in-memory database and walks the
//! load → score → select → update cycle the CLI drives.

use pk_tracker_core::models::{FieldKind, FieldValue};
use pk_tracker_core::stats::MilestoneId;
use pk_tracker_core::units::derive_molar_ranges;
use pk_tracker_core::{
    completion_score, newly_crossed, rank_candidates, select_candidate, DatasetStats, Database,
    DrugLookup, DrugRecord, DrugUpdate, MilestoneLedger, PkError, PkField, RecordStore,
};

/// A record with the first `present` tracked fields filled in.
fn drug_with(name: &str, present: usize) -> DrugRecord {
    let mut drug = DrugRecord::new(0, name);
    for field in PkField::TRACKED.iter().take(present) {
        let value = match field.kind() {
            FieldKind::Numeric => FieldValue::Number(1.0),
            FieldKind::Text => FieldValue::Text("none known".to_string()),
        };
        drug.apply(*field, Some(value));
    }
    drug
}

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.import_drugs(&[
        drug_with("Amoxicillin", 0),
        drug_with("Baclofen", 4),
        drug_with("Carbamazepine", 12),
        drug_with("Digoxin", 2),
        drug_with("Enalapril", 14),
    ])
    .unwrap();
    db
}

#[test]
fn test_selects_least_complete_started_record() {
    let db = seeded();
    let candidate = select_candidate(db.all_drugs().unwrap()).unwrap();

    assert_eq!(candidate.record.drug_name, "Digoxin");
    assert_eq!(candidate.completion_score(), 14);
    assert_eq!(candidate.missing_fields.len(), 12);
}

#[test]
fn test_queue_excludes_untouched_and_adequate_records() {
    let db = seeded();
    let names: Vec<String> = rank_candidates(db.all_drugs().unwrap())
        .into_iter()
        .map(|c| c.record.drug_name)
        .collect();

    assert_eq!(names, vec!["Digoxin", "Baclofen"]);
}

#[test]
fn test_curating_a_record_moves_selection_on() {
    let db = seeded();
    let digoxin = db.get(&DrugLookup::Name("digoxin".into())).unwrap();

    let mut update = DrugUpdate::new();
    for field in PkField::TRACKED.iter().skip(2).take(10) {
        let value = match field.kind() {
            FieldKind::Numeric => FieldValue::Number(0.5),
            FieldKind::Text => FieldValue::Text("digoxigenin".to_string()),
        };
        update.insert(*field, Some(value));
    }
    let updated = db.update_drug(digoxin.id, &update).unwrap();
    assert_eq!(completion_score(&updated), 86);

    let candidate = select_candidate(db.all_drugs().unwrap()).unwrap();
    assert_eq!(candidate.record.drug_name, "Baclofen");
}

#[test]
fn test_nothing_to_do_when_all_adequate_or_untouched() {
    let db = Database::open_in_memory().unwrap();
    db.import_drugs(&[drug_with("Heparin", 0), drug_with("Insulin", 12)])
        .unwrap();

    assert!(select_candidate(db.all_drugs().unwrap()).is_none());
}

#[test]
fn test_update_with_molar_derivation() {
    let db = Database::open_in_memory().unwrap();
    let lithium = db
        .insert_drug(&DrugRecord::new(0, "Lithium").with(PkField::MolecularWeight, 6.94))
        .unwrap();

    let mut update = DrugUpdate::new()
        .set(PkField::TherapeuticRangeMin, 4.2)
        .set(PkField::TherapeuticRangeMax, 8.3);
    let derived = derive_molar_ranges(&mut update, &lithium);
    assert_eq!(derived.len(), 2);

    let stored = db.update_drug(lithium.id, &update).unwrap();
    let min_m = stored.therapeutic_range_min_m.unwrap();
    assert!((min_m - 4.2 / 6.94 / 1000.0).abs() < 1e-15);
    assert!(stored.therapeutic_range_max_m.is_some());

    let mut update = DrugUpdate::new().clear(PkField::TherapeuticRangeMax);
    derive_molar_ranges(&mut update, &stored);
    let stored = db.update_drug(lithium.id, &update).unwrap();
    assert!(stored.therapeutic_range_max.is_none());
    assert!(stored.therapeutic_range_max_m.is_none());
    assert!(stored.therapeutic_range_min_m.is_some());
}

#[test]
fn test_lookup_by_unknown_name_fails_with_suggestions_available() {
    let db = seeded();
    let err = db.get(&"Digoxn".parse().unwrap()).unwrap_err();
    assert!(matches!(err, PkError::RecordNotFound(_)));

    let suggestions = db.suggest_names("Digoxn", 3).unwrap();
    assert_eq!(suggestions.first().map(String::as_str), Some("Digoxin"));
}

#[test]
fn test_milestones_are_announced_once() {
    let db = Database::open_in_memory().unwrap();
    let mut drugs: Vec<DrugRecord> = (0..20)
        .map(|i| drug_with(&format!("Drug {:02}", i), 0))
        .collect();
    for drug in drugs.iter_mut().take(19) {
        drug.cmax_oral_mg_l = Some(1.0);
    }
    db.import_drugs(&drugs).unwrap();

    let stats = DatasetStats::compute(&db.all_drugs().unwrap());
    let first = newly_crossed(&stats, &db.announced().unwrap());
    assert_eq!(first.new_events.len(), 1);
    assert_eq!(first.new_events[0].id, MilestoneId::Cmax95);
    db.mark_announced(&first.new_events).unwrap();

    let second = newly_crossed(&stats, &db.announced().unwrap());
    assert!(second.new_events.is_empty());
}
