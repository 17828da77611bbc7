//! PK Tracker Core Library
//!
//! Completeness tracking for a pharmacokinetic parameter dataset.
//!
//! # Architecture
//!
//! ```text
//!   RecordStore (SQLite)
//!         │  all records
//!         ▼
//!   ┌──────────────┐      ┌─────────────────┐
//!   │ ScoreEngine  │─────▶│ CandidateSelector│──▶ one record to research
//!   └──────────────┘      └─────────────────┘
//!         │
//!         ▼
//!   StatsAggregator ──▶ MilestoneDetector ──▶ progress report
//!
//!   curated values ──▶ UnitConverter (molar ranges) ──▶ RecordStore::update
//! ```
//!
//! Everything except the store is a pure function of its inputs.
//!
//! # Modules
//!
//! - [`models`]: Drug record schema, field catalog, update payloads
//! - [`scoring`]: Completion score, missing fields, candidate selection
//! - [`units`]: mg/L → mol/L conversion
//! - [`stats`]: Dataset coverage statistics and milestones
//! - [`db`]: SQLite record store
//! - [`store`]: Record store and milestone ledger traits
//! - [`export`]: Progress report export

pub mod db;
pub mod export;
pub mod models;
pub mod scoring;
pub mod stats;
pub mod store;
pub mod units;

// Re-export commonly used types
pub use db::Database;
pub use export::ProgressReport;
pub use models::{DrugLookup, DrugRecord, DrugUpdate, FieldValue, PkField};
pub use scoring::{
    completion_score, missing_fields, rank_candidates, select_candidate, RecordScore,
    ScoredRecord,
};
pub use stats::{detect_milestones, newly_crossed, DatasetStats, MilestoneEvent, MilestoneId};
pub use store::{MilestoneLedger, RecordStore};
pub use units::to_molar;

use thiserror::Error;

/// Errors surfaced to callers of the core library.
#[derive(Debug, Error)]
pub enum PkError {
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PkResult<T> = Result<T, PkError>;

impl From<db::DbError> for PkError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => PkError::RecordNotFound(what),
            db::DbError::InvalidValue(msg) | db::DbError::Constraint(msg) => {
                PkError::InvalidInput(msg)
            }
            db::DbError::Json(e) => PkError::Serialization(e.to_string()),
            db::DbError::Sqlite(e) => PkError::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for PkError {
    fn from(e: serde_json::Error) -> Self {
        PkError::Serialization(e.to_string())
    }
}
