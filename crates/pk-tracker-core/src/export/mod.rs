//! Export functionality for progress reporting.

mod progress;

pub use progress::*;
