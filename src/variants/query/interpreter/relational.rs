//! Single typed comparison of a field against a value.

use crate::{err::QueryError, variants::query::schema::query::RelationalOperator};

use super::{Comparator, Comparison, Criterion, Field, Value};

/// Comparison of `field` against `value` with `operator`.
///
/// Equality and hashing are structural so that predicates can be
/// de-duplicated.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub struct RelationalPredicate {
    pub field: Field,
    pub value: Value,
    pub operator: RelationalOperator,
}

impl RelationalPredicate {
    pub fn new(field: Field, value: impl Into<Value>, operator: RelationalOperator) -> Self {
        Self {
            field,
            value: value.into(),
            operator,
        }
    }

    /// Translate into a `Criterion` the storage can evaluate.
    ///
    /// # Errors
    ///
    /// Fails for the `NONE` operator, for ordering operators on non-numeric
    /// fields, and when the value shape does not fit the operator (`IN`
    /// needs a list, all others a scalar).
    pub fn evaluate(&self) -> Result<Criterion, QueryError> {
        let comparator = match self.operator {
            RelationalOperator::Eq => Comparator::Eq,
            RelationalOperator::Gt => Comparator::Gt,
            RelationalOperator::Lt => Comparator::Lt,
            RelationalOperator::Gte => Comparator::Gte,
            RelationalOperator::Lte => Comparator::Lte,
            RelationalOperator::In => Comparator::In,
            RelationalOperator::None => return Err(QueryError::AbsentOperator(self.field)),
        };

        match (comparator, &self.value) {
            (Comparator::In, Value::List(_)) => (),
            (Comparator::In, _) => {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "IN on {} needs a collection of values",
                    self.field
                )))
            }
            (_, Value::List(_)) => {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "{} on {} needs a single value",
                    comparator, self.field
                )))
            }
            (Comparator::Gt | Comparator::Lt | Comparator::Gte | Comparator::Lte, value)
                if !self.field.is_numeric() || matches!(value, Value::Str(_)) =>
            {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "{} is only defined for numbers, not for {}",
                    comparator, self.field
                )))
            }
            _ => (),
        }

        Ok(Criterion::Compare(Comparison {
            field: self.field,
            comparator,
            value: self.value.clone(),
        }))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::RelationalPredicate;
    use crate::{
        err::QueryError,
        variants::query::{
            interpreter::{Comparator, Comparison, Criterion, Field, Value},
            schema::query::RelationalOperator,
        },
    };

    #[rstest]
    #[case(RelationalOperator::Eq, Comparator::Eq)]
    #[case(RelationalOperator::Gt, Comparator::Gt)]
    #[case(RelationalOperator::Lt, Comparator::Lt)]
    #[case(RelationalOperator::Gte, Comparator::Gte)]
    #[case(RelationalOperator::Lte, Comparator::Lte)]
    fn evaluate_numeric(
        #[case] operator: RelationalOperator,
        #[case] comparator: Comparator,
    ) -> Result<(), anyhow::Error> {
        let predicate = RelationalPredicate::new(Field::Maf, 0.125, operator);
        assert_eq!(
            predicate.evaluate()?,
            Criterion::Compare(Comparison {
                field: Field::Maf,
                comparator,
                value: Value::Float(0.125),
            })
        );
        Ok(())
    }

    #[test]
    fn evaluate_in() -> Result<(), anyhow::Error> {
        let predicate =
            RelationalPredicate::new(Field::StudyId, vec!["PRJEB6930"], RelationalOperator::In);
        assert!(matches!(predicate.evaluate()?, Criterion::Compare(_)));
        Ok(())
    }

    #[test]
    fn evaluate_none_fails_fast() {
        let predicate = RelationalPredicate::new(Field::Maf, 0.5, RelationalOperator::None);
        assert!(matches!(
            predicate.evaluate(),
            Err(QueryError::AbsentOperator(Field::Maf))
        ));
    }

    #[rstest]
    #[case(RelationalPredicate::new(Field::StudyId, "PRJEB6930", RelationalOperator::In))]
    #[case(RelationalPredicate::new(Field::Maf, vec![0.5], RelationalOperator::Gt))]
    #[case(RelationalPredicate::new(Field::Alternate, "A", RelationalOperator::Gt))]
    #[case(RelationalPredicate::new(Field::Maf, "x", RelationalOperator::Lte))]
    fn evaluate_rejects_shape_mismatch(#[case] predicate: RelationalPredicate) {
        assert!(matches!(
            predicate.evaluate(),
            Err(QueryError::InvalidFilterSpecification(_))
        ));
    }

    #[test]
    fn structural_equality() {
        let predicates: HashSet<RelationalPredicate> = [
            RelationalPredicate::new(Field::Sift, 0.5, RelationalOperator::Lt),
            RelationalPredicate::new(Field::Sift, 0.5, RelationalOperator::Lt),
            RelationalPredicate::new(Field::Sift, 0.5, RelationalOperator::Gt),
            RelationalPredicate::new(Field::Polyphen, 0.5, RelationalOperator::Lt),
        ]
        .into_iter()
        .collect();
        assert_eq!(predicates.len(), 3);
    }
}
