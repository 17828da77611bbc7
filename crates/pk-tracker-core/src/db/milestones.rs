//! Announced-milestone persistence.

use std::collections::BTreeSet;

use rusqlite::params;

use super::{Database, DbResult};
use crate::stats::{MilestoneEvent, MilestoneId};

impl Database {
    /// Ids of every milestone already announced.
    ///
    /// Rows with unknown tags (e.g. written by a newer version) are skipped.
    pub fn announced_milestones(&self) -> DbResult<BTreeSet<MilestoneId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM announced_milestones")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut announced = BTreeSet::new();
        for row in rows {
            let tag = row?;
            match tag.parse::<MilestoneId>() {
                Ok(id) => {
                    announced.insert(id);
                }
                Err(e) => tracing::warn!("ignoring stored milestone: {}", e),
            }
        }
        Ok(announced)
    }

    /// Mark milestones as announced. Already-recorded ids are left untouched.
    pub fn record_milestones(&self, events: &[MilestoneEvent]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for event in events {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO announced_milestones (id, message) VALUES (?1, ?2)",
                params![event.id.tag(), event.message],
            )?;
        }
        tx.commit()?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{detect_milestones, DatasetStats};

    #[test]
    fn test_record_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.announced_milestones().unwrap().is_empty());

        let stats = DatasetStats {
            total: 20,
            with_any_cmax: 19,
            ..Default::default()
        };
        let events = detect_milestones(&stats);
        assert_eq!(db.record_milestones(&events).unwrap(), 1);
        assert_eq!(db.record_milestones(&events).unwrap(), 0);

        let announced = db.announced_milestones().unwrap();
        assert_eq!(announced.len(), 1);
        assert!(announced.contains(&MilestoneId::Cmax95));
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO announced_milestones (id, message) VALUES ('v9-future', 'x')",
                [],
            )
            .unwrap();
        assert!(db.announced_milestones().unwrap().is_empty());
    }
}
