//! Drug record models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FieldValue, PkField};

/// One drug and its pharmacokinetic parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: i64,
    /// Drug name, unique ignoring case
    pub drug_name: String,
    /// Oral Cmax (mg/L)
    pub cmax_oral_mg_l: Option<f64>,
    /// IV Cmax (mg/L)
    pub cmax_iv_mg_l: Option<f64>,
    /// Topical Cmax (mg/L)
    pub cmax_topical_mg_l: Option<f64>,
    /// Elimination half-life (hours)
    pub half_life_hours: Option<f64>,
    /// Time to peak concentration (hours)
    pub tmax_hours: Option<f64>,
    /// Area under the curve (mg·h/L)
    pub auc_mg_h_l: Option<f64>,
    /// Time to steady state (days)
    pub steady_state_days: Option<f64>,
    pub protein_binding_percent: Option<f64>,
    /// Volume of distribution (L/kg)
    pub vd_l_kg: Option<f64>,
    /// Therapeutic range lower bound (mg/L)
    pub therapeutic_range_min: Option<f64>,
    /// Therapeutic range upper bound (mg/L)
    pub therapeutic_range_max: Option<f64>,
    /// Therapeutic range lower bound (mol/L)
    pub therapeutic_range_min_m: Option<f64>,
    /// Therapeutic range upper bound (mol/L)
    pub therapeutic_range_max_m: Option<f64>,
    /// Standard adult dose (mg)
    pub adult_dose_mg: Option<f64>,
    pub active_metabolites: Option<String>,
    pub food_effect: Option<String>,
    /// CSF/plasma ratio (%)
    pub cns_penetration_percent: Option<f64>,
    /// Molecular weight (g/mol)
    pub molecular_weight: Option<f64>,
    /// Last modification time, set by the store
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DrugRecord {
    /// Create an empty record with only identity set.
    pub fn new(id: i64, drug_name: impl Into<String>) -> Self {
        Self {
            id,
            drug_name: drug_name.into(),
            ..Default::default()
        }
    }

    /// Current value of a field.
    pub fn value(&self, field: PkField) -> Option<FieldValue> {
        let number = |v: Option<f64>| v.map(FieldValue::Number);
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        match field {
            PkField::CmaxOralMgL => number(self.cmax_oral_mg_l),
            PkField::CmaxIvMgL => number(self.cmax_iv_mg_l),
            PkField::CmaxTopicalMgL => number(self.cmax_topical_mg_l),
            PkField::HalfLifeHours => number(self.half_life_hours),
            PkField::TmaxHours => number(self.tmax_hours),
            PkField::AucMgHL => number(self.auc_mg_h_l),
            PkField::SteadyStateDays => number(self.steady_state_days),
            PkField::ProteinBindingPercent => number(self.protein_binding_percent),
            PkField::VdLKg => number(self.vd_l_kg),
            PkField::TherapeuticRangeMin => number(self.therapeutic_range_min),
            PkField::TherapeuticRangeMax => number(self.therapeutic_range_max),
            PkField::TherapeuticRangeMinM => number(self.therapeutic_range_min_m),
            PkField::TherapeuticRangeMaxM => number(self.therapeutic_range_max_m),
            PkField::AdultDoseMg => number(self.adult_dose_mg),
            PkField::ActiveMetabolites => text(&self.active_metabolites),
            PkField::FoodEffect => text(&self.food_effect),
            PkField::CnsPenetrationPercent => number(self.cns_penetration_percent),
            PkField::MolecularWeight => number(self.molecular_weight),
        }
    }

    /// Whether a field holds a value. Zero and empty text count as present.
    pub fn is_present(&self, field: PkField) -> bool {
        match field {
            PkField::CmaxOralMgL => self.cmax_oral_mg_l.is_some(),
            PkField::CmaxIvMgL => self.cmax_iv_mg_l.is_some(),
            PkField::CmaxTopicalMgL => self.cmax_topical_mg_l.is_some(),
            PkField::HalfLifeHours => self.half_life_hours.is_some(),
            PkField::TmaxHours => self.tmax_hours.is_some(),
            PkField::AucMgHL => self.auc_mg_h_l.is_some(),
            PkField::SteadyStateDays => self.steady_state_days.is_some(),
            PkField::ProteinBindingPercent => self.protein_binding_percent.is_some(),
            PkField::VdLKg => self.vd_l_kg.is_some(),
            PkField::TherapeuticRangeMin => self.therapeutic_range_min.is_some(),
            PkField::TherapeuticRangeMax => self.therapeutic_range_max.is_some(),
            PkField::TherapeuticRangeMinM => self.therapeutic_range_min_m.is_some(),
            PkField::TherapeuticRangeMaxM => self.therapeutic_range_max_m.is_some(),
            PkField::AdultDoseMg => self.adult_dose_mg.is_some(),
            PkField::ActiveMetabolites => self.active_metabolites.is_some(),
            PkField::FoodEffect => self.food_effect.is_some(),
            PkField::CnsPenetrationPercent => self.cns_penetration_percent.is_some(),
            PkField::MolecularWeight => self.molecular_weight.is_some(),
        }
    }

    /// Set or clear a field in place.
    ///
    /// A value whose kind does not match the field leaves the record unchanged
    /// and returns `false`.
    pub fn apply(&mut self, field: PkField, value: Option<FieldValue>) -> bool {
        let slot_f64 = |slot: &mut Option<f64>, value: Option<FieldValue>| match value {
            None => {
                *slot = None;
                true
            }
            Some(FieldValue::Number(n)) => {
                *slot = Some(n);
                true
            }
            Some(FieldValue::Text(_)) => false,
        };
        let slot_text = |slot: &mut Option<String>, value: Option<FieldValue>| match value {
            None => {
                *slot = None;
                true
            }
            Some(FieldValue::Text(s)) => {
                *slot = Some(s);
                true
            }
            Some(FieldValue::Number(_)) => false,
        };

        match field {
            PkField::CmaxOralMgL => slot_f64(&mut self.cmax_oral_mg_l, value),
            PkField::CmaxIvMgL => slot_f64(&mut self.cmax_iv_mg_l, value),
            PkField::CmaxTopicalMgL => slot_f64(&mut self.cmax_topical_mg_l, value),
            PkField::HalfLifeHours => slot_f64(&mut self.half_life_hours, value),
            PkField::TmaxHours => slot_f64(&mut self.tmax_hours, value),
            PkField::AucMgHL => slot_f64(&mut self.auc_mg_h_l, value),
            PkField::SteadyStateDays => slot_f64(&mut self.steady_state_days, value),
            PkField::ProteinBindingPercent => slot_f64(&mut self.protein_binding_percent, value),
            PkField::VdLKg => slot_f64(&mut self.vd_l_kg, value),
            PkField::TherapeuticRangeMin => slot_f64(&mut self.therapeutic_range_min, value),
            PkField::TherapeuticRangeMax => slot_f64(&mut self.therapeutic_range_max, value),
            PkField::TherapeuticRangeMinM => slot_f64(&mut self.therapeutic_range_min_m, value),
            PkField::TherapeuticRangeMaxM => slot_f64(&mut self.therapeutic_range_max_m, value),
            PkField::AdultDoseMg => slot_f64(&mut self.adult_dose_mg, value),
            PkField::ActiveMetabolites => slot_text(&mut self.active_metabolites, value),
            PkField::FoodEffect => slot_text(&mut self.food_effect, value),
            PkField::CnsPenetrationPercent => {
                slot_f64(&mut self.cns_penetration_percent, value)
            }
            PkField::MolecularWeight => slot_f64(&mut self.molecular_weight, value),
        }
    }

    /// Builder used mostly by tests and fixtures.
    pub fn with(mut self, field: PkField, value: impl Into<FieldValue>) -> Self {
        self.apply(field, Some(value.into()));
        self
    }
}

/// How a caller refers to a drug: numeric id or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrugLookup {
    Id(i64),
    Name(String),
}

impl FromStr for DrugLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("drug identifier must not be empty".into());
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<i64>()
                .map(DrugLookup::Id)
                .map_err(|e| format!("invalid drug id {}: {}", trimmed, e));
        }
        Ok(DrugLookup::Name(trimmed.to_string()))
    }
}

impl fmt::Display for DrugLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrugLookup::Id(id) => write!(f, "id {}", id),
            DrugLookup::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}
