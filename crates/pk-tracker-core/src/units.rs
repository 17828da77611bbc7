//! Mass-to-molar concentration conversion.

use crate::models::{DrugRecord, DrugUpdate, FieldValue, PkField};

/// Convert a mass concentration (mg/L) to molar concentration (mol/L).
///
/// mg/L divided by g/mol gives mmol/L; dividing by 1000 gives mol/L.
/// Returns `None` for absent, zero, negative or non-finite inputs.
pub fn to_molar(mass_mg_per_l: Option<f64>, molecular_weight: Option<f64>) -> Option<f64> {
    let mass = mass_mg_per_l?;
    let weight = molecular_weight?;

    if !mass.is_finite() || !weight.is_finite() || mass <= 0.0 || weight <= 0.0 {
        return None;
    }

    Some((mass / weight) / 1000.0)
}

const RANGE_PAIRS: [(PkField, PkField); 2] = [
    (PkField::TherapeuticRangeMin, PkField::TherapeuticRangeMinM),
    (PkField::TherapeuticRangeMax, PkField::TherapeuticRangeMaxM),
];

/// Keep molar therapeutic-range fields in step with an update.
///
/// When the update touches `therapeutic_range_min`/`_max` or
/// `molecular_weight`, the matching `_m` field is recomputed from the merged
/// values (the update's, else `current`'s). If no conversion is possible the
/// `_m` field is cleared. Molar fields set explicitly by the update are left
/// as given. Returns the molar fields written.
pub fn derive_molar_ranges(update: &mut DrugUpdate, current: &DrugRecord) -> Vec<PkField> {
    let weight_changed = update.contains(PkField::MolecularWeight);
    let weight = merged_number(update, current, PkField::MolecularWeight);

    let mut derived = Vec::new();
    for (mass_field, molar_field) in RANGE_PAIRS {
        if update.contains(molar_field) {
            continue;
        }
        if !weight_changed && !update.contains(mass_field) {
            continue;
        }

        let mass = merged_number(update, current, mass_field);
        let molar = to_molar(mass, weight).map(FieldValue::Number);
        if molar.is_none() && !current.is_present(molar_field) {
            continue;
        }
        update.insert(molar_field, molar);
        derived.push(molar_field);
    }
    derived
}

fn merged_number(update: &DrugUpdate, current: &DrugRecord, field: PkField) -> Option<f64> {
    if update.contains(field) {
        update.number(field)
    } else {
        current.value(field).as_ref().and_then(FieldValue::as_number)
    }
}
