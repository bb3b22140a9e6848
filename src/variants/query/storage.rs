//! The storage seam and an in-memory implementation on top of a JSON lines
//! variant collection.

use std::{io::BufRead, path::Path};

use crate::{common::open_read_maybe_gz, err::StorageError};

use super::{
    interpreter::Criterion,
    projection::ProjectionSpec,
    schema::{data::VariantRecord, query::Page},
    sorting::ByCoordinate,
};

/// Requested order of returned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Storage order.
    #[default]
    Unordered,
    /// By chromosome, then start position, ascending.
    ByCoordinate,
}

/// Storage collaborator that evaluates criterion trees.
///
/// Implementations must be safe to share between concurrent read-only
/// queries.
pub trait VariantStore: Send + Sync {
    /// Return the records matching `criterion` in the given order and
    /// window, with the fields of `projection` excluded.
    fn find(
        &self,
        criterion: &Criterion,
        sort: Sort,
        page: Page,
        projection: &ProjectionSpec,
    ) -> Result<Vec<VariantRecord>, StorageError>;

    /// Return the number of records matching `criterion`.
    fn count(&self, criterion: &Criterion) -> Result<u64, StorageError>;

    /// Return whether any record matches `criterion`.
    fn exists(&self, criterion: &Criterion) -> Result<bool, StorageError> {
        Ok(self.count(criterion)? > 0)
    }
}

/// Read-only collection held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    records: Vec<VariantRecord>,
}

impl InMemoryStore {
    pub fn new(records: Vec<VariantRecord>) -> Self {
        Self { records }
    }

    /// Load from a JSON lines file, transparently decompressing `.gz`.
    pub fn load<P>(path: P) -> Result<Self, StorageError>
    where
        P: AsRef<Path>,
    {
        tracing::debug!("loading variants from {:?}", path.as_ref());
        let reader = std::io::BufReader::new(open_read_maybe_gz(path)?);
        let mut records = Vec::new();
        for (no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|source| StorageError::Json { line: no + 1, source })?;
            records.push(record);
        }
        tracing::debug!("loaded {} variants", records.len());
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Whether `seqvar` passes `criterion`, logging misses.
fn passes(criterion: &Criterion, seqvar: &VariantRecord) -> bool {
    let res = criterion.matches(seqvar);
    if !res {
        tracing::trace!(
            "variant {}:{}-{} {}>{} fails criterion",
            &seqvar.chromosome,
            seqvar.start,
            seqvar.end,
            &seqvar.reference,
            &seqvar.alternate
        );
    }
    res
}

impl VariantStore for InMemoryStore {
    fn find(
        &self,
        criterion: &Criterion,
        sort: Sort,
        page: Page,
        projection: &ProjectionSpec,
    ) -> Result<Vec<VariantRecord>, StorageError> {
        let mut matching = self
            .records
            .iter()
            .filter(|seqvar| passes(criterion, seqvar))
            .map(ByCoordinate::from)
            .collect::<Vec<_>>();
        if sort == Sort::ByCoordinate {
            matching.sort();
        }
        Ok(matching
            .into_iter()
            .skip(page.skip)
            .take(page.limit.unwrap_or(usize::MAX))
            .map(|by_coordinate| projection.apply(by_coordinate.seqvar.clone()))
            .collect())
    }

    fn count(&self, criterion: &Criterion) -> Result<u64, StorageError> {
        Ok(self
            .records
            .iter()
            .filter(|seqvar| passes(criterion, seqvar))
            .count() as u64)
    }

    fn exists(&self, criterion: &Criterion) -> Result<bool, StorageError> {
        Ok(self.records.iter().any(|seqvar| passes(criterion, seqvar)))
    }
}
