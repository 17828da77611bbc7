//! Dataset-wide coverage statistics.

mod milestones;

pub use milestones::*;

use serde::{Deserialize, Serialize};

use crate::models::DrugRecord;

/// Coverage counts over every record at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total: usize,
    /// Oral, IV or topical Cmax present
    pub with_any_cmax: usize,
    pub with_oral_cmax: usize,
    pub with_iv_cmax: usize,
    pub with_topical_cmax: usize,
    pub with_half_life: usize,
    /// Tmax and AUC both present
    pub with_timing_data: usize,
    /// Therapeutic range min and max both present
    pub with_therapeutic_range: usize,
    /// (Oral or IV Cmax) and half-life present
    pub with_complete_pk_profile: usize,
    /// When the snapshot was computed (RFC 3339)
    #[serde(default)]
    pub taken_at: Option<String>,
}

impl DatasetStats {
    /// Single pass over the records.
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DrugRecord>,
    {
        let mut stats = Self {
            taken_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        for drug in records {
            let oral = drug.cmax_oral_mg_l.is_some();
            let iv = drug.cmax_iv_mg_l.is_some();
            let topical = drug.cmax_topical_mg_l.is_some();
            let half_life = drug.half_life_hours.is_some();

            stats.total += 1;
            stats.with_any_cmax += usize::from(oral || iv || topical);
            stats.with_oral_cmax += usize::from(oral);
            stats.with_iv_cmax += usize::from(iv);
            stats.with_topical_cmax += usize::from(topical);
            stats.with_half_life += usize::from(half_life);
            stats.with_timing_data +=
                usize::from(drug.tmax_hours.is_some() && drug.auc_mg_h_l.is_some());
            stats.with_therapeutic_range += usize::from(
                drug.therapeutic_range_min.is_some() && drug.therapeutic_range_max.is_some(),
            );
            stats.with_complete_pk_profile += usize::from((oral || iv) && half_life);
        }

        stats
    }

    /// `count` as a percentage of `total`; 0.0 for an empty dataset.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }

    /// Every sub-count with its name, for reporting and invariant checks.
    ///
    /// Each count is at most `total`. A complete profile needs oral or IV
    /// Cmax, so `with_complete_pk_profile <= with_any_cmax` as well.
    pub fn counts(&self) -> [(&'static str, usize); 8] {
        [
            ("withAnyCmax", self.with_any_cmax),
            ("withOralCmax", self.with_oral_cmax),
            ("withIvCmax", self.with_iv_cmax),
            ("withTopicalCmax", self.with_topical_cmax),
            ("withHalfLife", self.with_half_life),
            ("withTimingData", self.with_timing_data),
            ("withTherapeuticRange", self.with_therapeutic_range),
            ("withCompletePkProfile", self.with_complete_pk_profile),
        ]
    }
}
