use crate::{
    err::QueryError,
    variants::query::schema::query::{FilterSet, RelationalOperator},
};

use super::{relational::RelationalPredicate, Criterion, Field};

/// Study membership criterion; absent if no study is given.
pub(super) fn studies_criterion(filter_set: &FilterSet) -> Result<Option<Criterion>, QueryError> {
    if filter_set.studies.is_empty() {
        return Ok(None);
    }
    RelationalPredicate::new(
        Field::StudyId,
        filter_set.studies.clone(),
        RelationalOperator::In,
    )
    .evaluate()
    .map(Some)
}

/// Consequence type criterion; absent if no term is given.
pub(super) fn consequences_criterion(
    filter_set: &FilterSet,
) -> Result<Option<Criterion>, QueryError> {
    if filter_set.consequence_types.is_empty() {
        return Ok(None);
    }
    let accessions = filter_set
        .consequence_types
        .iter()
        .map(|term| term.0 as i64)
        .collect::<Vec<_>>();
    RelationalPredicate::new(Field::ConsequenceType, accessions, RelationalOperator::In)
        .evaluate()
        .map(Some)
}
