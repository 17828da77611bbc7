//! SQLite schema definition.

/// Complete database schema for the PK tracker.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Drugs
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    cmax_oral_mg_l REAL,
    cmax_iv_mg_l REAL,
    cmax_topical_mg_l REAL,
    half_life_hours REAL,
    tmax_hours REAL,
    auc_mg_h_l REAL,
    steady_state_days REAL,
    protein_binding_percent REAL,
    vd_l_kg REAL,
    therapeutic_range_min REAL,
    therapeutic_range_max REAL,
    therapeutic_range_min_m REAL,                -- mol/L, derived from mg/L
    therapeutic_range_max_m REAL,                -- mol/L, derived from mg/L
    adult_dose_mg REAL,
    active_metabolites TEXT,
    food_effect TEXT,
    cns_penetration_percent REAL,
    molecular_weight REAL,                       -- g/mol
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_drugs_name ON drugs(drug_name);

-- ============================================================================
-- Milestones already announced (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS announced_milestones (
    id TEXT PRIMARY KEY,                         -- milestone tag
    message TEXT NOT NULL,
    announced_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Columns selected for a full drug record, in `DrugRecord` field order.
pub const DRUG_COLUMNS: &str = "id, drug_name, cmax_oral_mg_l, cmax_iv_mg_l, cmax_topical_mg_l, \
     half_life_hours, tmax_hours, auc_mg_h_l, steady_state_days, protein_binding_percent, \
     vd_l_kg, therapeutic_range_min, therapeutic_range_max, therapeutic_range_min_m, \
     therapeutic_range_max_m, adult_dose_mg, active_metabolites, food_effect, \
     cns_penetration_percent, molecular_weight, updated_at";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PkField;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_every_field_has_a_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        for field in PkField::ALL {
            let sql = format!("SELECT {} FROM drugs", field.column());
            assert!(conn.prepare(&sql).is_ok(), "missing column {}", field);
            assert!(DRUG_COLUMNS.contains(field.column()));
        }
    }

    #[test]
    fn test_drug_names_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO drugs (drug_name) VALUES ('Metformin')", [])
            .unwrap();
        let result = conn.execute("INSERT INTO drugs (drug_name) VALUES ('METFORMIN')", []);
        assert!(result.is_err());
    }
}
