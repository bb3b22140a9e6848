//! Supporting code for the variant query definition.

use std::{fmt, str::FromStr};

use crate::err::{ArgError, QueryError};

use super::data::VariantType;

/// Relational operator of a filter.
///
/// `None` marks a filter that is absent and must never reach the comparison
/// logic.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RelationalOperator {
    /// Equal.
    Eq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Member of collection.
    In,
    /// No filter.
    #[default]
    None,
}

/// Operator of a numeric threshold filter.
///
/// Only ordering and equality; the "no filter" case is `Option::None` on the
/// filter itself.
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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ThresholdOperator {
    /// Equal.
    Eq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
}

impl From<ThresholdOperator> for RelationalOperator {
    fn from(val: ThresholdOperator) -> Self {
        match val {
            ThresholdOperator::Eq => RelationalOperator::Eq,
            ThresholdOperator::Gt => RelationalOperator::Gt,
            ThresholdOperator::Lt => RelationalOperator::Lt,
            ThresholdOperator::Gte => RelationalOperator::Gte,
            ThresholdOperator::Lte => RelationalOperator::Lte,
        }
    }
}

/// Data structure to hold a genomic region, closed interval `[start, end]`.
#[derive(
    serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone,
)]
pub struct Region {
    /// Chromosome name.
    pub chromosome: String,
    /// Start position, inclusive.
    pub start: i64,
    /// End position, inclusive.
    pub end: i64,
}

impl Region {
    /// Construct new region.
    pub fn new(chromosome: &str, start: i64, end: i64) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            end,
        }
    }

    /// Whether the region is inverted, i.e., cannot contain any position.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Parse `chr:start-end` or `chr` (the whole chromosome).
impl FromStr for Region {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if !s.is_empty() && !s.contains('-') => Ok(Region::new(s, 1, i64::MAX)),
            None => Err(ArgError::RegionInvalidFormat(s.to_string())),
            Some((chromosome, range)) => {
                let (start, end) = range
                    .split_once('-')
                    .ok_or_else(|| ArgError::RegionInvalidFormat(s.to_string()))?;
                if chromosome.is_empty() {
                    return Err(ArgError::RegionInvalidFormat(s.to_string()));
                }
                let start = start.replace(',', "").parse::<i64>()?;
                let end = end.replace(',', "").parse::<i64>()?;
                Ok(Region::new(chromosome, start, end))
            }
        }
    }
}

/// A Sequence Ontology term, stored as its numeric accession.
#[derive(
    serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy,
)]
pub struct SoTerm(pub u32);

impl fmt::Display for SoTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SO:{:07}", self.0)
    }
}

/// Parse `SO:0001627` (prefix is case-insensitive).
impl FromStr for SoTerm {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .get(..3)
            .filter(|prefix| prefix.eq_ignore_ascii_case("SO:"))
            .map(|_| &s[3..])
            .ok_or_else(|| ArgError::SoTermInvalidFormat(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArgError::SoTermInvalidFormat(s.to_string()));
        }
        digits
            .parse::<u32>()
            .map(SoTerm)
            .map_err(|_| ArgError::SoTermInvalidFormat(s.to_string()))
    }
}

/// A numeric threshold filter (allele frequency, PolyPhen or SIFT score).
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct NumericFilter {
    /// The comparison operator.
    pub operator: ThresholdOperator,
    /// The threshold value.
    pub value: f64,
}

impl NumericFilter {
    /// Validate a raw operator/value pair.
    ///
    /// Returns `Ok(None)` for the "no filter" case (operator absent or `NONE`
    /// and value absent) and rejects half-specified pairs.
    pub fn try_new(
        name: &str,
        operator: Option<RelationalOperator>,
        value: Option<f64>,
    ) -> Result<Option<Self>, QueryError> {
        let (operator, value) = match (operator.unwrap_or_default(), value) {
            (RelationalOperator::None, None) => return Ok(None),
            (RelationalOperator::None, Some(value)) => {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "{name} value {value} given without operator"
                )))
            }
            (operator, None) => {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "{name} operator {operator} given without value"
                )))
            }
            (RelationalOperator::In, Some(_)) => {
                return Err(QueryError::InvalidFilterSpecification(format!(
                    "{name} is a numeric threshold and does not support IN"
                )))
            }
            (RelationalOperator::Eq, Some(value)) => (ThresholdOperator::Eq, value),
            (RelationalOperator::Gt, Some(value)) => (ThresholdOperator::Gt, value),
            (RelationalOperator::Lt, Some(value)) => (ThresholdOperator::Lt, value),
            (RelationalOperator::Gte, Some(value)) => (ThresholdOperator::Gte, value),
            (RelationalOperator::Lte, Some(value)) => (ThresholdOperator::Lte, value),
        };
        if value.is_nan() {
            return Err(QueryError::InvalidFilterSpecification(format!(
                "{name} {operator} needs a number, got NaN"
            )));
        }
        Ok(Some(Self { operator, value }))
    }
}

/// Exact position filter, as used by presence queries.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash, Debug, Clone, Default)]
pub struct LocusFilter {
    /// Chromosome name.
    pub chromosome: String,
    /// Required start position.
    pub start: i64,
    /// Required end position, if any.
    pub end: Option<i64>,
    /// Required variant type, if any.
    pub variant_type: Option<VariantType>,
    /// Required alternate allele, if any.
    pub alternate: Option<String>,
}

/// Validated set of filters of one query.
///
/// All active classes are combined with AND, the regions with OR.  The
/// default value has no active filter and matches every record.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default)]
pub struct FilterSet {
    /// Variant identifier to match against `ids`.
    pub id: Option<String>,
    /// Regions, any of which the variant must overlap.
    pub regions: Vec<Region>,
    /// Exact locus.
    pub locus: Option<LocusFilter>,
    /// Studies the variant must have been seen in (any of).
    pub studies: Vec<String>,
    /// Consequence types the variant must have (any of).
    pub consequence_types: Vec<SoTerm>,
    /// Minor allele frequency threshold.
    pub maf: Option<NumericFilter>,
    /// PolyPhen score threshold.
    pub polyphen: Option<NumericFilter>,
    /// SIFT score threshold.
    pub sift: Option<NumericFilter>,
}

/// Raw filter parameters as handed over by the transport layer.
#[serde_with::serde_as]
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterParams {
    /// Variant identifier.
    pub id: Option<String>,
    /// Regions as `chr:start-end` strings.
    #[serde_as(as = "Vec<serde_with::DisplayFromStr>")]
    pub regions: Vec<Region>,
    /// Study identifiers.
    pub studies: Vec<String>,
    /// Consequence types as `SO:nnnnnnn` strings.
    pub consequence_types: Vec<String>,
    /// Operator for the minor allele frequency.
    pub maf_operator: Option<RelationalOperator>,
    /// Value for the minor allele frequency.
    pub maf: Option<f64>,
    /// Operator for the PolyPhen score.
    pub polyphen_operator: Option<RelationalOperator>,
    /// Value for the PolyPhen score.
    pub polyphen: Option<f64>,
    /// Operator for the SIFT score.
    pub sift_operator: Option<RelationalOperator>,
    /// Value for the SIFT score.
    pub sift: Option<f64>,
}

impl TryFrom<FilterParams> for FilterSet {
    type Error = QueryError;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        let consequence_types = params
            .consequence_types
            .iter()
            .map(|term| term.parse::<SoTerm>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| QueryError::InvalidFilterSpecification(e.to_string()))?;
        Ok(Self {
            id: params.id.filter(|id| !id.is_empty()),
            regions: params.regions,
            locus: None,
            studies: params.studies,
            consequence_types,
            maf: NumericFilter::try_new("maf", params.maf_operator, params.maf)?,
            polyphen: NumericFilter::try_new(
                "polyphen",
                params.polyphen_operator,
                params.polyphen,
            )?,
            sift: NumericFilter::try_new("sift", params.sift_operator, params.sift)?,
        })
    }
}

/// Skip/limit window over the ordered results.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct Page {
    /// Number of records to skip.
    pub skip: usize,
    /// Maximal number of records to return, `None` for all.
    pub limit: Option<usize>,
}

impl Page {
    /// Construct from raw values; non-positive values are "not set".
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: usize::try_from(skip).unwrap_or_default(),
            limit: usize::try_from(limit).ok().filter(|limit| *limit > 0),
        }
    }

    /// Window returning all records.
    pub fn unbounded() -> Self {
        Self::default()
    }
}
