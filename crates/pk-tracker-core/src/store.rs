//! Record store interface.
//!
//! The scoring and selection code never talks to storage directly; callers
//! load a snapshot through [`RecordStore`] and hand records over by value.

use std::collections::BTreeSet;

use crate::db::{Database, DbError};
use crate::models::{DrugLookup, DrugRecord, DrugUpdate};
use crate::stats::{MilestoneEvent, MilestoneId};
use crate::{PkError, PkResult};

/// CRUD access to drug records.
pub trait RecordStore {
    /// Every record, ordered by name.
    fn all_drugs(&self) -> PkResult<Vec<DrugRecord>>;

    /// Case-insensitive exact name match.
    fn drug_by_name(&self, name: &str) -> PkResult<Option<DrugRecord>>;

    fn drug_by_id(&self, id: i64) -> PkResult<Option<DrugRecord>>;

    /// Apply a partial update atomically; `RecordNotFound` if `id` is unknown.
    fn update_drug(&self, id: i64, update: &DrugUpdate) -> PkResult<DrugRecord>;

    fn find(&self, lookup: &DrugLookup) -> PkResult<Option<DrugRecord>> {
        match lookup {
            DrugLookup::Id(id) => self.drug_by_id(*id),
            DrugLookup::Name(name) => self.drug_by_name(name),
        }
    }

    /// Like [`find`](Self::find) but absence is an error.
    fn get(&self, lookup: &DrugLookup) -> PkResult<DrugRecord> {
        self.find(lookup)?
            .ok_or_else(|| PkError::RecordNotFound(lookup.to_string()))
    }
}

/// Persistent set of milestones already announced.
pub trait MilestoneLedger {
    fn announced(&self) -> PkResult<BTreeSet<MilestoneId>>;

    fn mark_announced(&self, events: &[MilestoneEvent]) -> PkResult<()>;
}

impl RecordStore for Database {
    fn all_drugs(&self) -> PkResult<Vec<DrugRecord>> {
        Ok(self.list_drugs()?)
    }

    fn drug_by_name(&self, name: &str) -> PkResult<Option<DrugRecord>> {
        Ok(self.get_drug_by_name(name)?)
    }

    fn drug_by_id(&self, id: i64) -> PkResult<Option<DrugRecord>> {
        Ok(self.get_drug(id)?)
    }

    fn update_drug(&self, id: i64, update: &DrugUpdate) -> PkResult<DrugRecord> {
        self.update_drug_fields(id, update).map_err(|e| match e {
            DbError::NotFound(_) => PkError::RecordNotFound(format!("id {}", id)),
            other => other.into(),
        })
    }
}

impl MilestoneLedger for Database {
    fn announced(&self) -> PkResult<BTreeSet<MilestoneId>> {
        Ok(self.announced_milestones()?)
    }

    fn mark_announced(&self, events: &[MilestoneEvent]) -> PkResult<()> {
        self.record_milestones(events)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PkField;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_drug(&DrugRecord::new(0, "Allopurinol").with(PkField::CmaxOralMgL, 2.0))
            .unwrap();
        db
    }

    #[test]
    fn test_find_by_id_and_name() {
        let db = setup();
        let by_name = db
            .find(&DrugLookup::Name("ALLOPURINOL".into()))
            .unwrap()
            .unwrap();
        let by_id = db.find(&DrugLookup::Id(by_name.id)).unwrap().unwrap();
        assert_eq!(by_name, by_id);
    }

    #[test]
    fn test_get_missing_is_record_not_found() {
        let db = setup();
        let err = db.get(&DrugLookup::Name("Nope".into())).unwrap_err();
        assert!(matches!(err, PkError::RecordNotFound(_)));
    }

    #[test]
    fn test_update_unknown_id_maps_to_record_not_found() {
        let db = setup();
        let err = db
            .update_drug(999, &DrugUpdate::new().set(PkField::TmaxHours, 1.0))
            .unwrap_err();
        assert!(matches!(err, PkError::RecordNotFound(_)));
    }

    #[test]
    fn test_update_wrong_kind_maps_to_invalid_input() {
        let db = setup();
        let id = db.all_drugs().unwrap()[0].id;
        let err = db
            .update_drug(id, &DrugUpdate::new().set(PkField::TmaxHours, "soon"))
            .unwrap_err();
        assert!(matches!(err, PkError::InvalidInput(_)));
    }
}
