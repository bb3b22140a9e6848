use std::num::ParseIntError;

use crate::variants::query::interpreter::Field;

/// Errors raised while building or evaluating a variant query.
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    /// Operator and value of a filter do not fit together.
    #[error("Invalid filter specification: {0}")]
    InvalidFilterSpecification(String),
    /// A predicate with the `NONE` operator reached evaluation.
    #[error("Predicate on {0} has no operator and cannot be evaluated")]
    AbsentOperator(Field),
    /// Negative position in a beacon query.
    #[error("Please provide a positive number as start position (got {0})")]
    InvalidPositionInput(i64),
    /// Failure reported by the storage collaborator.
    #[error("Storage failure")]
    Storage(#[from] StorageError),
}

/// Errors raised by a `VariantStore` implementation.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("I/O error when reading variant collection")]
    Io(#[from] std::io::Error),
    #[error("Invalid variant record in line {line}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[allow(dead_code)]
    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    #[error("Invalid format in region: {0}")]
    RegionInvalidFormat(String),
    #[error("Invalid integer coordinates in region")]
    RegionInvalidInts(#[from] ParseIntError),
    #[error("Invalid Sequence Ontology term: {0}")]
    SoTermInvalidFormat(String),
}
