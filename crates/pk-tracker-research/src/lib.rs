//! Research orchestration for the PK tracker.
//!
//! Turns the least complete drug record into an outbound research request
//! and folds curated results back into the store.
//!
//! - [`request`]: request construction (topic and ordered requirements)
//! - [`prompts`]: human-readable research prompt
//! - [`sink`]: where requests go ([`CommandSink`], [`RecordingSink`])
//! - [`researcher`]: the load → select → request cycle and curated updates

pub mod prompts;
pub mod request;
pub mod researcher;
pub mod sink;

pub use prompts::*;
pub use request::*;
pub use researcher::*;
pub use sink::*;

use pk_tracker_core::PkError;
use thiserror::Error;

/// Research errors.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error(transparent)]
    Store(#[from] PkError),

    #[error("Research sink unavailable: {0}")]
    SinkUnavailable(String),
}

pub type ResearchResult<T> = Result<T, ResearchError>;
