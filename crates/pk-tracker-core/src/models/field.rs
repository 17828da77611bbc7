//! Pharmacokinetic field catalog and partial-update payloads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of fields that count toward a record's completion score.
pub const TRACKED_FIELD_COUNT: usize = 14;

/// An updatable column of a drug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PkField {
    CmaxOralMgL,
    CmaxIvMgL,
    CmaxTopicalMgL,
    HalfLifeHours,
    TmaxHours,
    AucMgHL,
    SteadyStateDays,
    ProteinBindingPercent,
    VdLKg,
    TherapeuticRangeMin,
    TherapeuticRangeMax,
    TherapeuticRangeMinM,
    TherapeuticRangeMaxM,
    AdultDoseMg,
    ActiveMetabolites,
    FoodEffect,
    CnsPenetrationPercent,
    MolecularWeight,
}

/// Storage kind of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Text,
}

impl PkField {
    /// Tracked fields in catalog order. Missing-field lists follow this order.
    pub const TRACKED: [PkField; TRACKED_FIELD_COUNT] = [
        PkField::CmaxOralMgL,
        PkField::CmaxIvMgL,
        PkField::HalfLifeHours,
        PkField::TmaxHours,
        PkField::AucMgHL,
        PkField::SteadyStateDays,
        PkField::ProteinBindingPercent,
        PkField::VdLKg,
        PkField::TherapeuticRangeMin,
        PkField::TherapeuticRangeMax,
        PkField::AdultDoseMg,
        PkField::ActiveMetabolites,
        PkField::FoodEffect,
        PkField::CnsPenetrationPercent,
    ];

    /// Every updatable column.
    pub const ALL: [PkField; 18] = [
        PkField::CmaxOralMgL,
        PkField::CmaxIvMgL,
        PkField::CmaxTopicalMgL,
        PkField::HalfLifeHours,
        PkField::TmaxHours,
        PkField::AucMgHL,
        PkField::SteadyStateDays,
        PkField::ProteinBindingPercent,
        PkField::VdLKg,
        PkField::TherapeuticRangeMin,
        PkField::TherapeuticRangeMax,
        PkField::TherapeuticRangeMinM,
        PkField::TherapeuticRangeMaxM,
        PkField::AdultDoseMg,
        PkField::ActiveMetabolites,
        PkField::FoodEffect,
        PkField::CnsPenetrationPercent,
        PkField::MolecularWeight,
    ];

    /// Column name in the record store.
    pub fn column(self) -> &'static str {
        match self {
            PkField::CmaxOralMgL => "cmax_oral_mg_l",
            PkField::CmaxIvMgL => "cmax_iv_mg_l",
            PkField::CmaxTopicalMgL => "cmax_topical_mg_l",
            PkField::HalfLifeHours => "half_life_hours",
            PkField::TmaxHours => "tmax_hours",
            PkField::AucMgHL => "auc_mg_h_l",
            PkField::SteadyStateDays => "steady_state_days",
            PkField::ProteinBindingPercent => "protein_binding_percent",
            PkField::VdLKg => "vd_l_kg",
            PkField::TherapeuticRangeMin => "therapeutic_range_min",
            PkField::TherapeuticRangeMax => "therapeutic_range_max",
            PkField::TherapeuticRangeMinM => "therapeutic_range_min_m",
            PkField::TherapeuticRangeMaxM => "therapeutic_range_max_m",
            PkField::AdultDoseMg => "adult_dose_mg",
            PkField::ActiveMetabolites => "active_metabolites",
            PkField::FoodEffect => "food_effect",
            PkField::CnsPenetrationPercent => "cns_penetration_percent",
            PkField::MolecularWeight => "molecular_weight",
        }
    }

    /// Human-readable label, `None` for fields outside the catalog.
    pub fn label(self) -> Option<&'static str> {
        let label = match self {
            PkField::CmaxOralMgL => "Oral Cmax",
            PkField::CmaxIvMgL => "IV Cmax",
            PkField::HalfLifeHours => "Half-life",
            PkField::TmaxHours => "Tmax",
            PkField::AucMgHL => "AUC",
            PkField::SteadyStateDays => "Steady-state time",
            PkField::ProteinBindingPercent => "Protein binding",
            PkField::VdLKg => "Volume of distribution",
            PkField::TherapeuticRangeMin => "Therapeutic range minimum",
            PkField::TherapeuticRangeMax => "Therapeutic range maximum",
            PkField::AdultDoseMg => "Standard adult dose",
            PkField::ActiveMetabolites => "Active metabolites",
            PkField::FoodEffect => "Food effects",
            PkField::CnsPenetrationPercent => "CNS penetration",
            PkField::CmaxTopicalMgL
            | PkField::TherapeuticRangeMinM
            | PkField::TherapeuticRangeMaxM
            | PkField::MolecularWeight => return None,
        };
        Some(label)
    }

    /// Whether this field counts toward completeness.
    pub fn is_tracked(self) -> bool {
        self.label().is_some()
    }

    pub fn kind(self) -> FieldKind {
        match self {
            PkField::ActiveMetabolites | PkField::FoodEffect => FieldKind::Text,
            _ => FieldKind::Numeric,
        }
    }
}

impl fmt::Display for PkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for PkField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PkField::ALL
            .into_iter()
            .find(|field| field.column() == wanted)
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// A single field value in an update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Number(_) => FieldKind::Numeric,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Parse a command-line value for the given field.
    ///
    /// `null` clears the field. Numeric fields must parse as a finite `f64`.
    pub fn parse_for(field: PkField, raw: &str) -> Result<Option<FieldValue>, String> {
        if raw.eq_ignore_ascii_case("null") {
            return Ok(None);
        }
        match field.kind() {
            FieldKind::Numeric => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(FieldValue::Number(n))),
                Ok(_) => Err(format!("{} expects a finite number, got {:?}", field, raw)),
                Err(_) => Err(format!("{} expects a number, got {:?}", field, raw)),
            },
            FieldKind::Text => Ok(Some(FieldValue::Text(raw.to_string()))),
        }
    }
}

/// Partial update: field → new value (`None` clears the column).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrugUpdate {
    pub values: BTreeMap<PkField, Option<FieldValue>>,
}

impl DrugUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn set(mut self, field: PkField, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field, Some(value.into()));
        self
    }

    /// Builder-style clear.
    pub fn clear(mut self, field: PkField) -> Self {
        self.values.insert(field, None);
        self
    }

    pub fn insert(&mut self, field: PkField, value: Option<FieldValue>) {
        self.values.insert(field, value);
    }

    pub fn contains(&self, field: PkField) -> bool {
        self.values.contains_key(&field)
    }

    /// Numeric value set by this update, if any.
    pub fn number(&self, field: PkField) -> Option<f64> {
        self.values
            .get(&field)
            .and_then(|v| v.as_ref())
            .and_then(FieldValue::as_number)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields whose value kind does not match the column kind.
    pub fn mismatched_fields(&self) -> Vec<PkField> {
        self.values
            .iter()
            .filter_map(|(field, value)| match value {
                Some(v) if v.kind() != field.kind() => Some(*field),
                _ => None,
            })
            .collect()
    }

    /// Numeric fields set to NaN or an infinity.
    pub fn non_finite_fields(&self) -> Vec<PkField> {
        self.values
            .iter()
            .filter_map(|(field, value)| match value {
                Some(FieldValue::Number(n)) if !n.is_finite() => Some(*field),
                _ => None,
            })
            .collect()
    }

    /// Parse from a JSON object keyed by column names.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}
