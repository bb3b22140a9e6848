//! Code implementing the `query` sub command.

pub mod conf;
pub mod executor;
pub mod interpreter;
pub mod projection;
pub mod schema;
pub mod sorting;
pub mod storage;

use std::{fs::File, io::Write, time::Instant};

use clap::Parser;

use self::{
    conf::QueryConf,
    executor::QueryExecutor,
    projection::ProjectionSpec,
    schema::query::{FilterParams, FilterSet},
    storage::InMemoryStore,
};

/// Command line arguments for `query` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Run a filter query on a variant collection", long_about = None)]
pub struct Args {
    /// Path to the JSON lines variant collection (may be gzip-compressed).
    #[arg(long, required = true)]
    pub path_db: String,
    /// Path to query JSON file with the filter parameters.
    #[arg(long)]
    pub path_query_json: Option<String>,
    /// Path to the configuration file with query defaults.
    #[arg(long)]
    pub path_conf: Option<String>,
    /// Comma-separated list of fields to exclude from the records, e.g.,
    /// `files.attrs,st`.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Number of records to skip; non-positive values skip nothing.
    #[arg(long, allow_negative_numbers = true)]
    pub skip: Option<i64>,
    /// Maximal number of records to return; non-positive values return all.
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,
    /// Only count the matching records.
    #[arg(long, default_value_t = false)]
    pub count: bool,
    /// Path to the output JSON file, stdout if not given.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Count-only output of the `query` sub command.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    pub num_total_results: u64,
}

/// Load the filter set from `path`, the empty filter set if not given.
fn load_filter_set(path: Option<&str>) -> Result<FilterSet, anyhow::Error> {
    let Some(path) = path else {
        return Ok(FilterSet::default());
    };
    let params: FilterParams = serde_json::from_reader(File::open(path)?)?;
    tracing::debug!("filter params = {:?}", &params);
    Ok(FilterSet::try_from(params)?)
}

/// Main entry point for `query` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let conf = if let Some(path_conf) = &args.path_conf {
        tracing::info!("Loading query config...");
        QueryConf::load(path_conf)?
    } else {
        QueryConf::default()
    };
    tracing::debug!("conf = {:?}", &conf);

    tracing::info!("Loading query...");
    let filter_set = load_filter_set(args.path_query_json.as_deref())?;
    tracing::info!(
        "... done loading query = {}",
        &serde_json::to_string(&filter_set)?
    );

    tracing::info!("Loading variants...");
    let before_loading = Instant::now();
    let store = InMemoryStore::load(&args.path_db)?;
    tracing::info!(
        "... done loading {} variants in {:?}",
        store.len(),
        before_loading.elapsed()
    );

    tracing::info!("Running query...");
    let before_query = Instant::now();
    let executor = QueryExecutor::new(&store);
    let json = if args.count {
        let num_total_results = executor.count(&filter_set)?;
        serde_json::to_string_pretty(&CountResult { num_total_results })?
    } else {
        let projection = ProjectionSpec::new(&args.exclude);
        let page = conf.page(args.skip, args.limit);
        let result = executor.query(&filter_set, &projection, page)?;
        tracing::info!(
            "... returning {} of {} matching records",
            result.num_results,
            result.num_total_results
        );
        serde_json::to_string_pretty(&result)?
    };
    tracing::info!("... done running query in {:?}", before_query.elapsed());

    if let Some(path_output) = &args.path_output {
        let mut writer = std::io::BufWriter::new(File::create(path_output)?);
        writeln!(writer, "{json}")?;
        writer.flush()?;
    } else {
        writeln!(std::io::stdout().lock(), "{json}")?;
    }

    tracing::info!("All of `query` completed in {:?}", before_anything.elapsed());
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::{executor::QueryResult, run, Args, CountResult};
    use crate::variants::query::interpreter::test::record;

    fn write_db(path: &std::path::Path) -> Result<(), anyhow::Error> {
        let mut file = std::fs::File::create(path)?;
        for start in [183100, 183200, 185500, 189000] {
            let maf = if start > 185000 { 0.2 } else { 0.1 };
            writeln!(
                file,
                "{}",
                serde_json::to_string(&record("11", start, start, maf))?
            )?;
        }
        Ok(())
    }

    fn args(tmp_dir: &tempfile::TempDir) -> Args {
        Args {
            path_db: tmp_dir.path().join("db.jsonl").display().to_string(),
            path_query_json: Some(tmp_dir.path().join("query.json").display().to_string()),
            path_conf: None,
            exclude: Vec::new(),
            skip: None,
            limit: None,
            count: false,
            path_output: Some(tmp_dir.path().join("out.json").display().to_string()),
        }
    }

    #[test]
    fn run_region_query_excluding_files() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        write_db(&tmp_dir.path().join("db.jsonl"))?;
        std::fs::write(
            tmp_dir.path().join("query.json"),
            r#"{"regions": ["11:183000-183300"]}"#,
        )?;
        let args = Args {
            exclude: vec![String::from("files")],
            ..args(&tmp_dir)
        };

        run(&crate::common::Args::default(), &args)?;

        let result: QueryResult =
            serde_json::from_reader(std::fs::File::open(tmp_dir.path().join("out.json"))?)?;
        assert_eq!(result.num_results, 2);
        assert_eq!(result.num_total_results, 2);
        assert!(result.result.iter().all(|r| r.files.is_empty()));
        assert!(result.result.iter().all(|r| !r.ids.is_empty()));

        Ok(())
    }

    #[test]
    fn run_maf_count() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        write_db(&tmp_dir.path().join("db.jsonl"))?;
        std::fs::write(
            tmp_dir.path().join("query.json"),
            r#"{"regions": ["11:185000-190000"], "mafOperator": "GT", "maf": 0.125}"#,
        )?;
        let args = Args {
            count: true,
            ..args(&tmp_dir)
        };

        run(&crate::common::Args::default(), &args)?;

        let result: CountResult =
            serde_json::from_reader(std::fs::File::open(tmp_dir.path().join("out.json"))?)?;
        assert_eq!(result, CountResult { num_total_results: 2 });

        Ok(())
    }

    #[test]
    fn run_rejects_operator_without_value() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        write_db(&tmp_dir.path().join("db.jsonl"))?;
        std::fs::write(
            tmp_dir.path().join("query.json"),
            r#"{"siftOperator": "LT"}"#,
        )?;

        assert!(run(&crate::common::Args::default(), &args(&tmp_dir)).is_err());

        Ok(())
    }
}
