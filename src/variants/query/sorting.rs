//! Code for sorting `VariantRecord` records by coordinate.

use super::schema::data::VariantRecord;

/// Helper wrapper that allows to sort `VariantRecord` by coordinate.
///
/// Records are ordered by chromosome name and start; end and alleles break
/// ties so that pagination is deterministic.
#[derive(Debug)]
pub struct ByCoordinate<'a> {
    pub coordinate: (&'a str, i64, i64, &'a str, &'a str),
    pub seqvar: &'a VariantRecord,
}

impl<'a> From<&'a VariantRecord> for ByCoordinate<'a> {
    fn from(val: &'a VariantRecord) -> Self {
        Self {
            coordinate: (
                val.chromosome.as_str(),
                val.start,
                val.end,
                val.reference.as_str(),
                val.alternate.as_str(),
            ),
            seqvar: val,
        }
    }
}

impl PartialEq for ByCoordinate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for ByCoordinate<'_> {}

impl PartialOrd for ByCoordinate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByCoordinate<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.coordinate.cmp(&other.coordinate)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::ByCoordinate;
    use crate::variants::query::interpreter::test::record;

    #[test]
    fn sort_by_chromosome_then_start() {
        let records = vec![
            record("11", 190000, 190000, 0.1),
            record("10", 200000, 200000, 0.1),
            record("11", 180002, 180010, 0.1),
            record("11", 180002, 180002, 0.1),
        ];
        let mut sorted = records.iter().map(ByCoordinate::from).collect::<Vec<_>>();
        sorted.sort();

        let coords = sorted
            .iter()
            .map(|c| (c.coordinate.0, c.coordinate.1, c.coordinate.2))
            .collect::<Vec<_>>();
        assert_eq!(
            coords,
            vec![
                ("10", 200000, 200000),
                ("11", 180002, 180002),
                ("11", 180002, 180010),
                ("11", 190000, 190000),
            ]
        );
    }
}
