//! Code for representing the variant documents of the collection.
//!
//! The field names follow the compact document layout of the collection
//! (`files`, `st`, `annot`, `ct`, ...) so that records can be loaded as-is
//! and the dotted paths of `ProjectionSpec` read the same as stored fields.

use std::collections::BTreeSet;

use indexmap::IndexMap;

/// Type of a variant.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantType {
    /// Single nucleotide variant.
    #[default]
    Snv,
    /// Multi-nucleotide variant.
    Mnv,
    /// Insertion or deletion.
    Indel,
    /// Structural variant.
    Sv,
    /// Copy number variant.
    Cnv,
    /// Reference call.
    NoVariation,
}

/// One study/file a variant was seen in.
#[serde_with::skip_serializing_none]
#[derive(
    serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Default, derive_new::new,
)]
pub struct SourceEntry {
    /// Study identifier, e.g., `PRJEB6930`.
    pub sid: String,
    /// File identifier within the study.
    pub fid: String,
    /// Attributes from the `INFO` column.
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
    /// Format of the sample data, e.g., `GT`.
    #[serde(default)]
    pub fm: Option<String>,
    /// Per-sample genotype data.
    #[serde(default)]
    pub samp: IndexMap<String, IndexMap<String, String>>,
}

/// Population statistics of the variant in one study/file.
#[serde_with::skip_serializing_none]
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
pub struct VariantStats {
    /// Study identifier.
    pub sid: String,
    /// File identifier.
    pub fid: String,
    /// Minor allele frequency.
    pub maf: f64,
    /// Minor genotype frequency.
    #[serde(default)]
    pub mgf: f64,
    /// The minor allele.
    #[serde(default, rename = "mafAl")]
    pub maf_allele: Option<String>,
    /// The minor genotype.
    #[serde(default, rename = "mgfGt")]
    pub mgf_genotype: Option<String>,
}

/// A prediction score (PolyPhen, SIFT) with its description.
#[serde_with::skip_serializing_none]
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default, derive_new::new)]
pub struct Score {
    /// The numeric score.
    pub sc: f64,
    /// Description, e.g., `probably damaging`.
    #[serde(default)]
    pub desc: Option<String>,
}

/// Consequence of the variant on one transcript.
#[serde_with::skip_serializing_none]
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
pub struct ConsequenceType {
    /// Sequence Ontology accessions, e.g., `1627` for `SO:0001627`.
    #[serde(default)]
    pub so: Vec<u32>,
    /// Gene name.
    #[serde(default)]
    pub gn: Option<String>,
    /// Ensembl gene identifier.
    #[serde(default)]
    pub ensg: Option<String>,
    /// Ensembl transcript identifier.
    #[serde(default)]
    pub enst: Option<String>,
    /// PolyPhen prediction.
    #[serde(default)]
    pub polyphen: Option<Score>,
    /// SIFT prediction.
    #[serde(default)]
    pub sift: Option<Score>,
}

/// Annotation block of a variant.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Annotation {
    /// Consequence types, one per affected feature.
    #[serde(default)]
    pub ct: Vec<ConsequenceType>,
}

/// A variant document as stored in the collection.
#[serde_with::skip_serializing_none]
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone, Default)]
pub struct VariantRecord {
    /// Identifiers, e.g., `rs776523794` and `ss664037839`.
    #[serde(default)]
    pub ids: BTreeSet<String>,
    /// Chromosome name.
    #[serde(rename = "chr")]
    pub chromosome: String,
    /// 1-based start position.
    pub start: i64,
    /// 1-based inclusive end position.
    pub end: i64,
    /// Reference allele.
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Alternate allele.
    #[serde(rename = "alt", default)]
    pub alternate: String,
    /// Variant type.
    #[serde(rename = "type", default)]
    pub variant_type: VariantType,
    /// Source entries keyed by `<sid>_<fid>`.
    #[serde(default)]
    pub files: IndexMap<String, SourceEntry>,
    /// Statistics per study/file.
    #[serde(default)]
    pub st: Vec<VariantStats>,
    /// Annotation.
    #[serde(default)]
    pub annot: Option<Annotation>,
    /// HGVS descriptions.
    #[serde(default)]
    pub hgvs: Vec<String>,
}

impl VariantRecord {
    /// Return iterator over all consequence type entries of the annotation.
    pub fn consequence_types(&self) -> impl Iterator<Item = &ConsequenceType> {
        self.annot.iter().flat_map(|annot| annot.ct.iter())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{VariantRecord, VariantType};

    #[test]
    fn deserialize_compact_document() -> Result<(), anyhow::Error> {
        let json = r#"{
            "ids": ["rs776523794", "ss664037839"],
            "chr": "11",
            "start": 180002,
            "end": 180002,
            "ref": "G",
            "alt": "A",
            "type": "SNV",
            "files": {
                "PRJEB6930_ERZ015345": {
                    "sid": "PRJEB6930",
                    "fid": "ERZ015345",
                    "attrs": {"QUAL": "100"},
                    "samp": {"HG00096": {"GT": "0|1"}}
                }
            },
            "st": [{"sid": "PRJEB6930", "fid": "ERZ015345", "maf": 0.25}],
            "annot": {"ct": [{"so": [1627], "polyphen": {"sc": 0.9}}]}
        }"#;

        let record: VariantRecord = serde_json::from_str(json)?;

        assert_eq!(record.ids.len(), 2);
        assert_eq!(record.variant_type, VariantType::Snv);
        assert_eq!(record.files["PRJEB6930_ERZ015345"].attrs["QUAL"], "100");
        assert_eq!(record.st[0].maf, 0.25);
        assert_eq!(record.consequence_types().count(), 1);
        assert!(record.hgvs.is_empty());

        Ok(())
    }

    #[test]
    fn variant_type_string_forms() {
        assert_eq!(VariantType::Indel.to_string(), "INDEL");
        assert_eq!("NO_VARIATION".parse::<VariantType>(), Ok(VariantType::NoVariation));
    }
}
