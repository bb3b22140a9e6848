use crate::{
    err::QueryError,
    variants::query::schema::query::{FilterSet, RelationalOperator},
};

use super::{relational::RelationalPredicate, Criterion, Field};

/// Exact locus criterion: all given parts must be equal.
pub(super) fn criterion(filter_set: &FilterSet) -> Result<Option<Criterion>, QueryError> {
    let Some(locus) = &filter_set.locus else {
        return Ok(None);
    };

    let mut predicates = vec![
        RelationalPredicate::new(
            Field::Chromosome,
            locus.chromosome.as_str(),
            RelationalOperator::Eq,
        ),
        RelationalPredicate::new(Field::Start, locus.start, RelationalOperator::Eq),
    ];
    if let Some(end) = locus.end {
        predicates.push(RelationalPredicate::new(
            Field::End,
            end,
            RelationalOperator::Eq,
        ));
    }
    if let Some(variant_type) = locus.variant_type {
        predicates.push(RelationalPredicate::new(
            Field::VariantType,
            variant_type.to_string(),
            RelationalOperator::Eq,
        ));
    }
    if let Some(alternate) = &locus.alternate {
        predicates.push(RelationalPredicate::new(
            Field::Alternate,
            alternate.as_str(),
            RelationalOperator::Eq,
        ));
    }

    Ok(Some(Criterion::And(
        predicates
            .iter()
            .map(RelationalPredicate::evaluate)
            .collect::<Result<Vec<_>, _>>()?,
    )))
}
