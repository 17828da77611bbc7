//! Parsing of curated updates and import files.

use std::fs;
use std::path::Path;

use anyhow::Context;
use pk_tracker_core::{DrugRecord, DrugUpdate, FieldValue, PkField};

use crate::error::CliError;

/// Parse one `field=value` assignment. `field=null` clears the field.
pub fn parse_assignment(raw: &str) -> Result<(PkField, Option<FieldValue>), CliError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgument(format!("expected field=value, got {:?}", raw)))?;
    let field: PkField = name.parse().map_err(CliError::InvalidArgument)?;
    let value = FieldValue::parse_for(field, value).map_err(CliError::InvalidArgument)?;
    Ok((field, value))
}

/// Combine an optional JSON update file with `--set` assignments.
///
/// Assignments are applied after the file and win on conflict.
pub fn build_update(file: Option<&Path>, assignments: &[String]) -> anyhow::Result<DrugUpdate> {
    let mut update = match file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read update file {}", path.display()))?;
            DrugUpdate::from_json(&content)
                .map_err(|e| CliError::InvalidArgument(format!("{}: {}", path.display(), e)))?
        }
        None => DrugUpdate::new(),
    };

    for raw in assignments {
        let (field, value) = parse_assignment(raw)?;
        update.insert(field, value);
    }
    Ok(update)
}

/// Read an import file: a JSON array of drug records. Ids are ignored.
pub fn read_import_file(path: &Path) -> anyhow::Result<Vec<DrugRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read import file {}", path.display()))?;
    let drugs: Vec<DrugRecord> = serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidArgument(format!("{}: {}", path.display(), e)))?;

    if let Some(blank) = drugs.iter().position(|d| d.drug_name.trim().is_empty()) {
        return Err(CliError::InvalidArgument(format!("record {} has no drug_name", blank)).into());
    }
    Ok(drugs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_text_assignments() {
        assert_eq!(
            parse_assignment("half_life_hours=25.9").unwrap(),
            (PkField::HalfLifeHours, Some(FieldValue::Number(25.9)))
        );
        assert_eq!(
            parse_assignment("food_effect=Take with food").unwrap(),
            (
                PkField::FoodEffect,
                Some(FieldValue::Text("Take with food".into()))
            )
        );
        assert_eq!(
            parse_assignment("tmax_hours=null").unwrap(),
            (PkField::TmaxHours, None)
        );
    }

    #[test]
    fn rejects_bad_assignments() {
        assert!(parse_assignment("half_life_hours").is_err());
        assert!(parse_assignment("color=blue").is_err());
        assert!(parse_assignment("tmax_hours=soon").is_err());
        assert!(parse_assignment("tmax_hours=NaN").is_err());
        assert!(parse_assignment("vd_l_kg=inf").is_err());
    }

    #[test]
    fn set_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.json");
        fs::write(&path, r#"{"tmax_hours": 1.0, "food_effect": "none"}"#).unwrap();

        let update = build_update(Some(&path), &["tmax_hours=2.5".to_string()]).unwrap();
        assert_eq!(update.number(PkField::TmaxHours), Some(2.5));
        assert!(update.contains(PkField::FoodEffect));
    }

    #[test]
    fn reads_import_file_without_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drugs.json");
        fs::write(
            &path,
            r#"[{"drug_name": "Cisplatin", "half_life_hours": 25.9}, {"drug_name": "Digoxin"}]"#,
        )
        .unwrap();

        let drugs = read_import_file(&path).unwrap();
        assert_eq!(drugs.len(), 2);
        assert_eq!(drugs[0].half_life_hours, Some(25.9));
        assert_eq!(drugs[1].id, 0);
    }

    #[test]
    fn import_requires_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drugs.json");
        fs::write(&path, r#"[{"drug_name": " "}]"#).unwrap();

        assert!(read_import_file(&path).is_err());
    }
}
