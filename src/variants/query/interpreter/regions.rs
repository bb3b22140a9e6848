use indexmap::IndexSet;

use crate::err::QueryError;
use crate::variants::query::schema::query::{FilterSet, RelationalOperator, Region};

use super::{relational::RelationalPredicate, Criterion, Field};

/// OR-combination of genomic regions.
///
/// Identical regions are coalesced on construction; inverted regions are
/// kept but match nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionMatcher {
    regions: IndexSet<Region>,
}

impl RegionMatcher {
    pub fn new<'a>(regions: impl IntoIterator<Item = &'a Region>) -> Self {
        Self {
            regions: regions.into_iter().cloned().collect(),
        }
    }

    /// Build the OR-group criterion, `None` if there are no regions.
    pub fn criterion(&self) -> Result<Option<Criterion>, QueryError> {
        if self.regions.is_empty() {
            return Ok(None);
        }
        let alternatives = self
            .regions
            .iter()
            .filter(|region| {
                if region.is_inverted() {
                    tracing::debug!("region {} is inverted and matches nothing", region);
                }
                !region.is_inverted()
            })
            .map(region_criterion)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Criterion::Or(alternatives)))
    }
}

/// `chr == region.chr AND start <= region.end AND end >= region.start`
fn region_criterion(region: &Region) -> Result<Criterion, QueryError> {
    let predicates = [
        RelationalPredicate::new(
            Field::Chromosome,
            region.chromosome.as_str(),
            RelationalOperator::Eq,
        ),
        RelationalPredicate::new(Field::Start, region.end, RelationalOperator::Lte),
        RelationalPredicate::new(Field::End, region.start, RelationalOperator::Gte),
    ];
    Ok(Criterion::And(
        predicates
            .iter()
            .map(RelationalPredicate::evaluate)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

/// Regions criterion of `filter_set`, if any region is given.
pub(super) fn criterion(filter_set: &FilterSet) -> Result<Option<Criterion>, QueryError> {
    RegionMatcher::new(&filter_set.regions).criterion()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::RegionMatcher;
    use crate::variants::query::{
        interpreter::{test::record, Criterion},
        schema::{data::VariantRecord, query::Region},
    };

    /// Closed-interval overlap on the same chromosome, evaluated directly.
    fn overlaps(region: &Region, seqvar_chrom: &str, seqvar_start: i64, seqvar_end: i64) -> bool {
        !region.is_inverted()
            && region.chromosome == seqvar_chrom
            && seqvar_start <= region.end
            && seqvar_end >= region.start
    }

    fn overlaps_any(regions: &[Region], seqvar: &VariantRecord) -> bool {
        regions
            .iter()
            .any(|region| overlaps(region, &seqvar.chromosome, seqvar.start, seqvar.end))
    }

    #[rstest]
    #[case(("1", 100, 200), "1", 100, 200, true)]
    #[case(("1", 100, 200), "1", 200, 300, true)]
    #[case(("1", 100, 200), "1", 50, 100, true)]
    #[case(("1", 100, 200), "1", 50, 300, true)]
    #[case(("1", 100, 200), "1", 201, 300, false)]
    #[case(("1", 100, 200), "1", 10, 99, false)]
    #[case(("1", 100, 200), "2", 100, 200, false)]
    #[case(("chr1", 100, 200), "1", 100, 200, false)]
    #[case(("1", 250, 200), "1", 100, 300, false)]
    #[case(("1", 250, 200), "1", 220, 220, false)]
    fn overlaps_closed_interval(
        #[case] region: (&str, i64, i64),
        #[case] seqvar_chrom: &str,
        #[case] seqvar_start: i64,
        #[case] seqvar_end: i64,
        #[case] expected: bool,
    ) -> Result<(), anyhow::Error> {
        let region = Region::new(region.0, region.1, region.2);
        let seqvar = record(seqvar_chrom, seqvar_start, seqvar_end, 0.1);
        let criterion = RegionMatcher::new([&region])
            .criterion()?
            .expect("region given");

        assert_eq!(
            overlaps(&region, seqvar_chrom, seqvar_start, seqvar_end),
            expected
        );
        assert_eq!(criterion.matches(&seqvar), expected);

        Ok(())
    }

    #[test]
    fn criterion_agrees_with_direct_overlap() -> Result<(), anyhow::Error> {
        let regions = [
            Region::new("11", 180001, 180079),
            Region::new("11", 180150, 180180),
            Region::new("11", 61098, 60916),
        ];
        let criterion = RegionMatcher::new(&regions)
            .criterion()?
            .expect("regions given");
        for start in (60_000..181_000).step_by(37) {
            let seqvar = record("11", start, start + 3, 0.1);
            assert_eq!(
                criterion.matches(&seqvar),
                overlaps_any(&regions, &seqvar),
                "start = {}",
                start
            );
        }
        Ok(())
    }

    #[test]
    fn duplicate_regions_are_coalesced() {
        let matcher = RegionMatcher::new(&[
            Region::new("11", 183000, 183300),
            Region::new("11", 183000, 183300),
        ]);
        match matcher.criterion() {
            Ok(Some(Criterion::Or(alternatives))) => assert_eq!(alternatives.len(), 1),
            other => panic!("unexpected criterion {:?}", other),
        }
    }

    #[test]
    fn only_inverted_regions_match_nothing() {
        let regions = [Region::new("11", 61098, 60916)];
        let criterion = RegionMatcher::new(&regions).criterion().ok();
        assert_eq!(criterion, Some(Some(Criterion::nothing())));
        assert!(!overlaps_any(&regions, &record("11", 61000, 61000, 0.1)));
    }

    #[tracing_test::traced_test]
    #[test]
    fn inverted_region_is_logged() {
        let _ = RegionMatcher::new(&[Region::new("11", 61098, 60916)]).criterion();
        assert!(logs_contain("11:61098-60916 is inverted"));
    }

    #[test]
    fn no_regions_no_criterion() {
        assert_eq!(RegionMatcher::default().criterion().ok(), Some(None));
    }
}
