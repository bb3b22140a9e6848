//! Translate a `FilterSet` into one criterion tree and evaluate it on
//! `VariantRecord` documents.
//!
//! `build_criterion` is the only place where a `FilterSet` is turned into
//! something the storage can evaluate; find, count and exists all go through
//! it so that they cannot disagree.

use std::hash::{Hash, Hasher};

mod identifier;
mod locus;
mod membership;
pub mod regions;
pub mod relational;
mod thresholds;

use crate::err::QueryError;

use super::schema::{data::VariantRecord, query::FilterSet};

/// The closed set of filterable fields, named by their document path.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
)]
pub enum Field {
    #[strum(serialize = "chr")]
    Chromosome,
    #[strum(serialize = "start")]
    Start,
    #[strum(serialize = "end")]
    End,
    #[strum(serialize = "ids")]
    Ids,
    #[strum(serialize = "type")]
    VariantType,
    #[strum(serialize = "alt")]
    Alternate,
    #[strum(serialize = "files.sid")]
    StudyId,
    #[strum(serialize = "st.maf")]
    Maf,
    #[strum(serialize = "annot.ct.polyphen.sc")]
    Polyphen,
    #[strum(serialize = "annot.ct.sift.sc")]
    Sift,
    #[strum(serialize = "annot.ct.so")]
    ConsequenceType,
}

impl Field {
    /// Whether ordering comparisons are defined on the field.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::Start | Field::End | Field::Maf | Field::Polyphen | Field::Sift
        )
    }

    /// Resolve the field on `record`; multi-valued fields yield all values.
    fn values<'a>(&self, record: &'a VariantRecord) -> Vec<FieldValue<'a>> {
        match self {
            Field::Chromosome => vec![FieldValue::Str(&record.chromosome)],
            Field::Start => vec![FieldValue::Int(record.start)],
            Field::End => vec![FieldValue::Int(record.end)],
            Field::Ids => record.ids.iter().map(|id| FieldValue::Str(id)).collect(),
            Field::VariantType => vec![FieldValue::Type(record.variant_type.to_string())],
            Field::Alternate => vec![FieldValue::Str(&record.alternate)],
            Field::StudyId => record
                .files
                .values()
                .map(|entry| FieldValue::Str(&entry.sid))
                .collect(),
            Field::Maf => record.st.iter().map(|st| FieldValue::Float(st.maf)).collect(),
            Field::Polyphen => record
                .consequence_types()
                .filter_map(|ct| ct.polyphen.as_ref())
                .map(|score| FieldValue::Float(score.sc))
                .collect(),
            Field::Sift => record
                .consequence_types()
                .filter_map(|ct| ct.sift.as_ref())
                .map(|score| FieldValue::Float(score.sc))
                .collect(),
            Field::ConsequenceType => record
                .consequence_types()
                .flat_map(|ct| ct.so.iter())
                .map(|so| FieldValue::Int(*so as i64))
                .collect(),
        }
    }
}

/// A value resolved from a record.
#[derive(Debug, Clone, PartialEq)]
enum FieldValue<'a> {
    Str(&'a str),
    Type(String),
    Int(i64),
    Float(f64),
}

impl FieldValue<'_> {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Str(_) | FieldValue::Type(_) => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(*s),
            FieldValue::Type(s) => Some(s.as_str()),
            FieldValue::Int(_) | FieldValue::Float(_) => None,
        }
    }
}

/// A query value.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) | Value::List(_) => None,
        }
    }

    /// Whether `field_value` equals this value; numbers compare across
    /// integer/float.
    fn equals(&self, field_value: &FieldValue) -> bool {
        match self {
            Value::Str(s) => field_value.as_str() == Some(s.as_str()),
            Value::Int(_) | Value::Float(_) => field_value.as_f64() == self.as_f64(),
            Value::List(_) => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(l) => l.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Str(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Str(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(val: Vec<T>) -> Self {
        Value::List(val.into_iter().map(Into::into).collect())
    }
}

/// Operator of an evaluable comparison; there is no "absent" variant.
#[derive(
    serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy, strum::Display,
)]
pub enum Comparator {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
}

/// A single field comparison as understood by the storage.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub struct Comparison {
    pub field: Field,
    pub comparator: Comparator,
    pub value: Value,
}

impl Comparison {
    /// Document-store semantics: a multi-valued field matches if any of its
    /// values does.
    fn matches(&self, record: &VariantRecord) -> bool {
        let values = self.field.values(record);
        let ordering: fn(f64, f64) -> bool = match self.comparator {
            Comparator::Eq => return values.iter().any(|v| self.value.equals(v)),
            Comparator::In => {
                return match &self.value {
                    Value::List(candidates) => values
                        .iter()
                        .any(|v| candidates.iter().any(|candidate| candidate.equals(v))),
                    _ => false,
                }
            }
            Comparator::Gt => |v, threshold| v > threshold,
            Comparator::Lt => |v, threshold| v < threshold,
            Comparator::Gte => |v, threshold| v >= threshold,
            Comparator::Lte => |v, threshold| v <= threshold,
        };
        let Some(threshold) = self.value.as_f64() else {
            return false;
        };
        values
            .iter()
            .filter_map(FieldValue::as_f64)
            .any(|v| ordering(v, threshold))
    }
}

/// AND/OR tree of comparisons.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub enum Criterion {
    Compare(Comparison),
    /// All children must match; empty matches everything.
    And(Vec<Criterion>),
    /// Any child must match; empty matches nothing.
    Or(Vec<Criterion>),
}

impl Criterion {
    /// The criterion matching every record.
    pub fn everything() -> Self {
        Criterion::And(Vec::new())
    }

    /// The criterion matching no record.
    pub fn nothing() -> Self {
        Criterion::Or(Vec::new())
    }

    /// Evaluate on `record`.
    pub fn matches(&self, record: &VariantRecord) -> bool {
        match self {
            Criterion::Compare(comparison) => comparison.matches(record),
            Criterion::And(children) => children.iter().all(|c| c.matches(record)),
            Criterion::Or(children) => children.iter().any(|c| c.matches(record)),
        }
    }
}

/// Build the criterion for `filter_set`.
///
/// Each filter class contributes at most one child of the top-level AND;
/// without any active class the result matches everything.
pub fn build_criterion(filter_set: &FilterSet) -> Result<Criterion, QueryError> {
    let clauses = [
        identifier::criterion(filter_set)?,
        regions::criterion(filter_set)?,
        locus::criterion(filter_set)?,
        membership::studies_criterion(filter_set)?,
        membership::consequences_criterion(filter_set)?,
        thresholds::criterion(filter_set)?,
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    tracing::debug!("built criterion with {} top-level clauses", clauses.len());
    tracing::trace!("clauses = {:?}", &clauses);
    Ok(Criterion::And(clauses))
}
