//! Code for supporting the query defaults configuration file.

use std::path::Path;

use super::schema::query::Page;

/// Defaults applied to `query` invocations.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct QueryConf {
    /// Limit to use when none is given.
    pub default_limit: Option<usize>,
    /// Upper bound for any limit, including "no limit".
    pub max_limit: Option<usize>,
}

impl QueryConf {
    /// Load from a TOML file.
    pub fn load<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let toml_str = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&toml_str)?)
    }

    /// Build the result window from raw command line values.
    pub fn page(&self, skip: Option<i64>, limit: Option<i64>) -> Page {
        let mut page = Page::new(skip.unwrap_or_default(), limit.unwrap_or_default());
        if page.limit.is_none() {
            page.limit = self.default_limit;
        }
        if let Some(max_limit) = self.max_limit {
            page.limit = Some(page.limit.map_or(max_limit, |limit| limit.min(max_limit)));
        }
        page
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::QueryConf;
    use crate::variants::query::schema::query::Page;

    #[test]
    fn load_toml() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("conf.toml");
        std::fs::write(&path, "default_limit = 10\nmax_limit = 100\n")?;

        assert_eq!(
            QueryConf::load(&path)?,
            QueryConf {
                default_limit: Some(10),
                max_limit: Some(100),
            }
        );

        Ok(())
    }

    #[test]
    fn load_empty_toml() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("conf.toml");
        std::fs::write(&path, "")?;

        assert_eq!(QueryConf::load(&path)?, QueryConf::default());

        Ok(())
    }

    #[rstest]
    #[case(QueryConf::default(), None, None, Page { skip: 0, limit: None })]
    #[case(QueryConf::default(), Some(5), Some(20), Page { skip: 5, limit: Some(20) })]
    #[case(QueryConf::default(), Some(-5), Some(-1), Page { skip: 0, limit: None })]
    #[case(QueryConf { default_limit: Some(10), max_limit: None }, None, None, Page { skip: 0, limit: Some(10) })]
    #[case(QueryConf { default_limit: Some(10), max_limit: None }, None, Some(50), Page { skip: 0, limit: Some(50) })]
    #[case(QueryConf { default_limit: None, max_limit: Some(100) }, None, None, Page { skip: 0, limit: Some(100) })]
    #[case(QueryConf { default_limit: None, max_limit: Some(100) }, None, Some(500), Page { skip: 0, limit: Some(100) })]
    #[case(QueryConf { default_limit: Some(10), max_limit: Some(100) }, Some(3), None, Page { skip: 3, limit: Some(10) })]
    fn page(
        #[case] conf: QueryConf,
        #[case] skip: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected: Page,
    ) {
        assert_eq!(conf.page(skip, limit), expected);
    }
}
