//! Execution of filter sets against a `VariantStore`.

use std::time::Instant;

use crate::err::QueryError;

use super::{
    interpreter::build_criterion,
    projection::ProjectionSpec,
    schema::{
        data::VariantRecord,
        query::{FilterSet, Page},
    },
    storage::{Sort, VariantStore},
};

/// Result of a query together with the result counts.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// The records of the requested window.
    pub result: Vec<VariantRecord>,
    /// Number of records in `result`.
    pub num_results: usize,
    /// Number of records matching, irrespective of the window.
    pub num_total_results: u64,
}

/// Runs find, count, and exists queries.
///
/// All three derive their criterion with `build_criterion` so that, for the
/// same filter set, `count` equals the length of an unbounded `find`.
#[derive(Clone, Copy)]
pub struct QueryExecutor<'a> {
    store: &'a dyn VariantStore,
}

impl std::fmt::Debug for QueryExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor").finish_non_exhaustive()
    }
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a dyn VariantStore) -> Self {
        Self { store }
    }

    /// Matching records ordered by coordinate, windowed by `page`.
    pub fn find(
        &self,
        filter_set: &FilterSet,
        projection: &ProjectionSpec,
        page: Page,
    ) -> Result<Vec<VariantRecord>, QueryError> {
        let criterion = build_criterion(filter_set)?;
        let before_find = Instant::now();
        let result = self
            .store
            .find(&criterion, Sort::ByCoordinate, page, projection)?;
        tracing::debug!(
            "found {} records in {:?}",
            result.len(),
            before_find.elapsed()
        );
        Ok(result)
    }

    /// Number of matching records.
    pub fn count(&self, filter_set: &FilterSet) -> Result<u64, QueryError> {
        let criterion = build_criterion(filter_set)?;
        let count = self.store.count(&criterion)?;
        tracing::debug!("counted {} records", count);
        Ok(count)
    }

    /// Whether any record matches.
    pub fn exists(&self, filter_set: &FilterSet) -> Result<bool, QueryError> {
        let criterion = build_criterion(filter_set)?;
        Ok(self.store.exists(&criterion)?)
    }

    /// Run `find` and `count` for the same filter set.
    pub fn query(
        &self,
        filter_set: &FilterSet,
        projection: &ProjectionSpec,
        page: Page,
    ) -> Result<QueryResult, QueryError> {
        let result = self.find(filter_set, projection, page)?;
        let num_total_results = self.count(filter_set)?;
        Ok(QueryResult {
            num_results: result.len(),
            num_total_results,
            result,
        })
    }
}
