//! Exclusion of fields from returned variant records.

use std::collections::BTreeSet;

use super::schema::data::VariantRecord;

/// The recognized exclusion paths.
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
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum ExcludePath {
    /// Identifiers.
    #[strum(serialize = "ids")]
    Ids,
    /// All source entries.
    #[strum(serialize = "files")]
    Files,
    /// The attributes of each source entry.
    #[strum(serialize = "files.attrs")]
    FilesAttrs,
    /// The sample data of each source entry.
    #[strum(serialize = "files.samp")]
    FilesSamples,
    /// Statistics.
    #[strum(serialize = "st")]
    Stats,
    /// The whole annotation.
    #[strum(serialize = "annot")]
    Annotation,
    /// The consequence types of the annotation.
    #[strum(serialize = "annot.ct")]
    ConsequenceTypes,
    /// HGVS descriptions.
    #[strum(serialize = "hgvs")]
    Hgvs,
}

/// Set of paths to exclude from returned records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectionSpec {
    exclude: BTreeSet<ExcludePath>,
}

impl ProjectionSpec {
    /// Build from dotted paths; unknown paths are ignored.
    pub fn new<S: AsRef<str>>(paths: impl IntoIterator<Item = S>) -> Self {
        let exclude = paths
            .into_iter()
            .filter_map(|path| {
                let path = path.as_ref().trim();
                match path.parse::<ExcludePath>() {
                    Ok(exclude_path) => Some(exclude_path),
                    Err(_) => {
                        tracing::debug!("ignoring unknown exclusion path {:?}", path);
                        None
                    }
                }
            })
            .collect();
        Self { exclude }
    }

    /// Whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty()
    }

    /// Remove the excluded fields from `record`.
    pub fn apply(&self, mut record: VariantRecord) -> VariantRecord {
        for path in &self.exclude {
            match path {
                ExcludePath::Ids => record.ids.clear(),
                ExcludePath::Files => record.files.clear(),
                ExcludePath::FilesAttrs => record
                    .files
                    .values_mut()
                    .for_each(|entry| entry.attrs.clear()),
                ExcludePath::FilesSamples => record
                    .files
                    .values_mut()
                    .for_each(|entry| entry.samp.clear()),
                ExcludePath::Stats => record.st.clear(),
                ExcludePath::Annotation => record.annot = None,
                ExcludePath::ConsequenceTypes => {
                    if let Some(annot) = record.annot.as_mut() {
                        annot.ct.clear();
                    }
                }
                ExcludePath::Hgvs => record.hgvs.clear(),
            }
        }
        record
    }
}
