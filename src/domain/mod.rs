//! Domain layer types and invariants.

pub mod apartments;
pub mod entities;
pub mod error;
pub mod types;
