use crate::{
    err::QueryError,
    variants::query::schema::query::{FilterSet, NumericFilter},
};

use super::{relational::RelationalPredicate, Criterion, Field};

/// Numeric threshold criteria on allele frequency and prediction scores.
///
/// Each active threshold becomes one comparison; they are combined with AND.
pub(super) fn criterion(filter_set: &FilterSet) -> Result<Option<Criterion>, QueryError> {
    let thresholds: [(Field, &Option<NumericFilter>); 3] = [
        (Field::Maf, &filter_set.maf),
        (Field::Polyphen, &filter_set.polyphen),
        (Field::Sift, &filter_set.sift),
    ];
    let clauses = thresholds
        .into_iter()
        .filter_map(|(field, filter)| {
            filter.map(|NumericFilter { operator, value }| {
                RelationalPredicate::new(field, value, operator.into()).evaluate()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if clauses.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Criterion::And(clauses)))
    }
}
