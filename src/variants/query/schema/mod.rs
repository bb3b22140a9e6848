//! Data structures for variant records and filter sets.

pub mod data;
pub mod query;
