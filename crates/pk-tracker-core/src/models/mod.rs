//! Domain models for the PK tracker.

mod drug;
mod field;

pub use drug::*;
pub use field::*;
