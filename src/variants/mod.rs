//! Querying of variant collections.

pub mod beacon;
pub mod query;
