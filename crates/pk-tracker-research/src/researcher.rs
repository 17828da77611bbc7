//! The research cycle: load, score, select, request.

use pk_tracker_core::units::derive_molar_ranges;
use pk_tracker_core::{
    newly_crossed, rank_candidates, DatasetStats, DrugLookup, DrugRecord, DrugUpdate,
    MilestoneLedger, PkError, PkField, ProgressReport, RecordScore, RecordStore, ScoredRecord,
};
use serde::Serialize;

use crate::{build_request, ResearchRequest, ResearchResult, ResearchSink};

/// A request that was handed to the sink.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchDispatch {
    pub candidate: ScoredRecord,
    pub request: ResearchRequest,
}

/// Result of one improvement pass.
#[derive(Debug, Clone)]
pub enum ImproveOutcome {
    /// Every record is untouched or adequately complete.
    NothingToDo,
    Requested(ResearchDispatch),
}

/// Result of applying a curated update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub record: DrugRecord,
    pub previous_score: RecordScore,
    pub new_score: RecordScore,
    /// Molar range fields recomputed or cleared from mass concentrations
    pub derived_fields: Vec<PkField>,
}

/// Drives selection and research over a record store and a sink.
pub struct Researcher<S, K> {
    store: S,
    sink: K,
}

impl<S: RecordStore, K: ResearchSink> Researcher<S, K> {
    pub fn new(store: S, sink: K) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Coverage statistics over the current store contents.
    pub fn status(&self) -> ResearchResult<DatasetStats> {
        let drugs = self.store.all_drugs()?;
        Ok(DatasetStats::compute(&drugs))
    }

    /// Eligible records, best candidate first.
    pub fn queue(&self) -> ResearchResult<Vec<ScoredRecord>> {
        Ok(rank_candidates(self.store.all_drugs()?))
    }

    /// The record the next improvement pass would pick.
    pub fn next_candidate(&self) -> ResearchResult<Option<ScoredRecord>> {
        Ok(self.queue()?.into_iter().next())
    }

    /// One pass: select the least complete record and request research on it.
    pub fn improve(&self) -> ResearchResult<ImproveOutcome> {
        let drugs = self.store.all_drugs()?;
        let stats = DatasetStats::compute(&drugs);
        tracing::info!(
            total = stats.total,
            with_any_cmax = stats.with_any_cmax,
            complete_profiles = stats.with_complete_pk_profile,
            "dataset status"
        );

        let Some(candidate) = rank_candidates(drugs).into_iter().next() else {
            tracing::info!("no record needs research");
            return Ok(ImproveOutcome::NothingToDo);
        };

        tracing::info!(
            drug = %candidate.record.drug_name,
            score = candidate.completion_score(),
            missing = candidate.score.missing_field_count,
            "selected research candidate"
        );
        Ok(ImproveOutcome::Requested(self.dispatch(candidate)?))
    }

    /// Request research on a specific record regardless of its score.
    pub fn research(&self, lookup: &DrugLookup) -> ResearchResult<ResearchDispatch> {
        let record = self.store.get(lookup)?;
        self.dispatch(ScoredRecord::new(record))
    }

    /// Apply a curated update, keeping molar ranges in step with mass ranges.
    pub fn apply_update(&self, id: i64, mut update: DrugUpdate) -> ResearchResult<UpdateOutcome> {
        if update.is_empty() {
            return Err(PkError::InvalidInput("update sets no fields".into()).into());
        }

        let current = self
            .store
            .drug_by_id(id)?
            .ok_or_else(|| PkError::RecordNotFound(format!("id {}", id)))?;
        let previous_score = RecordScore::of(&current);

        let derived_fields = derive_molar_ranges(&mut update, &current);
        let record = self.store.update_drug(id, &update)?;
        let new_score = RecordScore::of(&record);

        tracing::info!(
            drug = %record.drug_name,
            from = previous_score.completion_score,
            to = new_score.completion_score,
            "applied curated update"
        );

        Ok(UpdateOutcome {
            record,
            previous_score,
            new_score,
            derived_fields,
        })
    }

    fn dispatch(&self, candidate: ScoredRecord) -> ResearchResult<ResearchDispatch> {
        let request = build_request(&candidate);

        if let Err(e) = self.sink.request_research(&request) {
            tracing::warn!(drug = %candidate.record.drug_name, "research request failed: {}", e);
            return Err(e);
        }

        tracing::info!(
            drug = %candidate.record.drug_name,
            request_id = %request.request_id,
            "research requested"
        );
        Ok(ResearchDispatch { candidate, request })
    }
}

impl<S: RecordStore + MilestoneLedger, K: ResearchSink> Researcher<S, K> {
    /// Progress report with milestones crossed since the last one.
    ///
    /// New milestones are marked announced before returning.
    pub fn progress_report(&self) -> ResearchResult<ProgressReport> {
        let stats = self.status()?;
        let update = newly_crossed(&stats, &self.store.announced()?);
        self.store.mark_announced(&update.new_events)?;
        Ok(ProgressReport::new(stats, update.new_events))
    }
}
