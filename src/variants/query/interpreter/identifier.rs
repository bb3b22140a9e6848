use crate::{
    err::QueryError,
    variants::query::schema::query::{FilterSet, RelationalOperator},
};

use super::{relational::RelationalPredicate, Criterion, Field};

/// Identifier criterion: the variant's `ids` must contain the identifier.
pub(super) fn criterion(filter_set: &FilterSet) -> Result<Option<Criterion>, QueryError> {
    filter_set
        .id
        .as_ref()
        .map(|id| {
            RelationalPredicate::new(Field::Ids, vec![id.as_str()], RelationalOperator::In)
                .evaluate()
        })
        .transpose()
}
