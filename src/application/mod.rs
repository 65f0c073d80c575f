//! Application services layer.

pub mod apartments;
pub mod error;
pub mod pagination;
pub mod query;
pub mod repos;
pub mod seed;
