//! Drug record database operations.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use strsim::jaro_winkler;

use super::{Database, DbError, DbResult, DRUG_COLUMNS};
use crate::models::{DrugRecord, DrugUpdate, FieldValue, PkField};

/// Minimum Jaro-Winkler similarity for a name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.80;

/// Counts from a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl Database {
    /// Insert a new drug. The record's `id` and `updated_at` are ignored.
    pub fn insert_drug(&self, drug: &DrugRecord) -> DbResult<DrugRecord> {
        let (columns, values) = field_values(drug);
        let placeholders: Vec<String> = (1..=columns.len() + 1).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO drugs (drug_name, {}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut params = vec![Value::Text(drug.drug_name.clone())];
        params.extend(values);

        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(|e| map_constraint(e, &drug.drug_name))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, drug = %drug.drug_name, "inserted drug");
        fetch_by_id(&self.conn, id)?.ok_or_else(|| DbError::NotFound(format!("drug id {}", id)))
    }

    /// Insert or merge drugs by name in one transaction.
    ///
    /// Existing rows keep any value the imported record leaves empty, so an
    /// import never clears data.
    pub fn import_drugs(&self, drugs: &[DrugRecord]) -> DbResult<ImportSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = ImportSummary::default();

        for drug in drugs {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM drugs WHERE drug_name = ?1",
                    [&drug.drug_name],
                    |row| row.get(0),
                )
                .optional()?;

            match existing {
                Some(id) => {
                    let (columns, values) = field_values(drug);
                    if !columns.is_empty() {
                        let assignments: Vec<String> = columns
                            .iter()
                            .enumerate()
                            .map(|(i, c)| format!("{c} = COALESCE(?{}, {c})", i + 1))
                            .collect();
                        let sql = format!(
                            "UPDATE drugs SET {}, updated_at = datetime('now') WHERE id = ?{}",
                            assignments.join(", "),
                            columns.len() + 1
                        );
                        let mut params = values;
                        params.push(Value::Integer(id));
                        tx.execute(&sql, params_from_iter(params))?;
                    }
                    summary.updated += 1;
                }
                None => {
                    let (columns, values) = field_values(drug);
                    let placeholders: Vec<String> =
                        (1..=columns.len() + 1).map(|i| format!("?{}", i)).collect();
                    let sql = format!(
                        "INSERT INTO drugs (drug_name, {}) VALUES ({})",
                        columns.join(", "),
                        placeholders.join(", ")
                    );
                    let mut params = vec![Value::Text(drug.drug_name.clone())];
                    params.extend(values);
                    tx.execute(&sql, params_from_iter(params))?;
                    summary.inserted += 1;
                }
            }
        }

        tx.commit()?;
        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            "imported drugs"
        );
        Ok(summary)
    }

    /// All drugs ordered by name.
    pub fn list_drugs(&self) -> DbResult<Vec<DrugRecord>> {
        let drugs =
            self.query_drugs(&format!("SELECT {} FROM drugs ORDER BY drug_name", DRUG_COLUMNS))?;
        tracing::debug!(count = drugs.len(), "loaded drugs");
        Ok(drugs)
    }

    /// Get a drug by ID.
    pub fn get_drug(&self, id: i64) -> DbResult<Option<DrugRecord>> {
        fetch_by_id(&self.conn, id)
    }

    /// Get a drug by exact name, ignoring case.
    pub fn get_drug_by_name(&self, name: &str) -> DbResult<Option<DrugRecord>> {
        let sql = format!("SELECT {} FROM drugs WHERE drug_name = ?1", DRUG_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [name.trim()], row_to_drug)
            .optional()?)
    }

    /// Apply a partial update atomically and return the updated record.
    pub fn update_drug_fields(&self, id: i64, update: &DrugUpdate) -> DbResult<DrugRecord> {
        let mismatched = update.mismatched_fields();
        if !mismatched.is_empty() {
            let names: Vec<&str> = mismatched.iter().map(|f| f.column()).collect();
            return Err(DbError::InvalidValue(format!(
                "wrong value type for {}",
                names.join(", ")
            )));
        }
        let non_finite = update.non_finite_fields();
        if !non_finite.is_empty() {
            let names: Vec<&str> = non_finite.iter().map(|f| f.column()).collect();
            return Err(DbError::InvalidValue(format!(
                "non-finite number for {}",
                names.join(", ")
            )));
        }

        let tx = self.conn.unchecked_transaction()?;

        if !update.is_empty() {
            let assignments: Vec<String> = update
                .values
                .keys()
                .enumerate()
                .map(|(i, field)| format!("{} = ?{}", field.column(), i + 1))
                .collect();
            let sql = format!(
                "UPDATE drugs SET {}, updated_at = datetime('now') WHERE id = ?{}",
                assignments.join(", "),
                update.values.len() + 1
            );

            let mut params: Vec<Value> = update.values.values().map(to_sql_value).collect();
            params.push(Value::Integer(id));

            let rows_affected = tx.execute(&sql, params_from_iter(params))?;
            if rows_affected == 0 {
                return Err(DbError::NotFound(format!("drug id {}", id)));
            }
        }

        let record =
            fetch_by_id(&tx, id)?.ok_or_else(|| DbError::NotFound(format!("drug id {}", id)))?;
        tx.commit()?;

        tracing::debug!(id, fields = update.values.len(), "updated drug");
        Ok(record)
    }

    /// Drugs with no value in `field`, ordered by name.
    pub fn drugs_missing(&self, field: PkField) -> DbResult<Vec<DrugRecord>> {
        self.query_drugs(&format!(
            "SELECT {} FROM drugs WHERE {} IS NULL ORDER BY drug_name",
            DRUG_COLUMNS,
            field.column()
        ))
    }

    /// Drugs lacking either oral or IV Cmax, ordered by name.
    pub fn drugs_missing_cmax(&self) -> DbResult<Vec<DrugRecord>> {
        self.query_drugs(&format!(
            "SELECT {} FROM drugs WHERE {} IS NULL OR {} IS NULL ORDER BY drug_name",
            DRUG_COLUMNS,
            PkField::CmaxOralMgL.column(),
            PkField::CmaxIvMgL.column()
        ))
    }

    fn query_drugs(&self, sql: &str) -> DbResult<Vec<DrugRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], row_to_drug)?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?);
        }
        Ok(drugs)
    }

    /// Names similar to `query`, most similar first.
    pub fn suggest_names(&self, query: &str, limit: usize) -> DbResult<Vec<String>> {
        let query_lower = query.trim().to_lowercase();
        let mut stmt = self.conn.prepare("SELECT drug_name FROM drugs")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut scored = Vec::new();
        for name in names {
            let name = name?;
            let similarity = jaro_winkler(&query_lower, &name.to_lowercase());
            if similarity >= SUGGESTION_THRESHOLD {
                scored.push((similarity, name));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(limit).map(|(_, name)| name).collect())
    }
}

fn fetch_by_id(conn: &Connection, id: i64) -> DbResult<Option<DrugRecord>> {
    let sql = format!("SELECT {} FROM drugs WHERE id = ?1", DRUG_COLUMNS);
    Ok(conn.query_row(&sql, [id], row_to_drug).optional()?)
}

/// Map a row selected with `DRUG_COLUMNS`.
fn row_to_drug(row: &Row<'_>) -> rusqlite::Result<DrugRecord> {
    Ok(DrugRecord {
        id: row.get(0)?,
        drug_name: row.get(1)?,
        cmax_oral_mg_l: row.get(2)?,
        cmax_iv_mg_l: row.get(3)?,
        cmax_topical_mg_l: row.get(4)?,
        half_life_hours: row.get(5)?,
        tmax_hours: row.get(6)?,
        auc_mg_h_l: row.get(7)?,
        steady_state_days: row.get(8)?,
        protein_binding_percent: row.get(9)?,
        vd_l_kg: row.get(10)?,
        therapeutic_range_min: row.get(11)?,
        therapeutic_range_max: row.get(12)?,
        therapeutic_range_min_m: row.get(13)?,
        therapeutic_range_max_m: row.get(14)?,
        adult_dose_mg: row.get(15)?,
        active_metabolites: row.get(16)?,
        food_effect: row.get(17)?,
        cns_penetration_percent: row.get(18)?,
        molecular_weight: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

/// Column names and values for every updatable field of a record.
fn field_values(drug: &DrugRecord) -> (Vec<&'static str>, Vec<Value>) {
    PkField::ALL
        .iter()
        .map(|field| (field.column(), to_sql_value(&drug.value(*field))))
        .unzip()
}

fn to_sql_value(value: &Option<FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::Number(n)) => Value::Real(*n),
        Some(FieldValue::Text(s)) => Value::Text(s.clone()),
    }
}

fn map_constraint(err: rusqlite::Error, name: &str) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            DbError::Constraint(format!("drug already exists: {}", name))
        }
        other => DbError::Sqlite(other),
    }
}
