//! Beacon-style presence queries ("was this allele seen at this position?").

use std::{io::Write, time::Instant};

use clap::Parser;

use crate::err::QueryError;

use super::query::{
    executor::QueryExecutor,
    schema::{
        data::VariantType,
        query::{FilterSet, LocusFilter},
    },
    storage::InMemoryStore,
};

/// Allele value that asks for any insertion/deletion at the position.
const INDEL_ALLELE: &str = "INDEL";

/// A presence question.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BeaconRequest {
    /// Chromosome name.
    pub reference_name: String,
    /// Position; must not be negative.
    pub start: i64,
    /// Alternate allele or `INDEL`.
    pub allele: String,
    /// Studies to look in; empty means any study.
    pub dataset_ids: Vec<String>,
}

/// Either the answer or the reason why there is none.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum BeaconOutcome {
    Exists(bool),
    ErrorMessage(String),
}

/// The answer to a `BeaconRequest`, echoing the request.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResponse {
    pub chromosome: String,
    pub start: i64,
    pub allele: String,
    /// The requested datasets, comma-separated.
    pub dataset_ids: String,
    #[serde(flatten)]
    pub outcome: BeaconOutcome,
}

impl BeaconResponse {
    fn new(request: &BeaconRequest, outcome: BeaconOutcome) -> Self {
        Self {
            chromosome: request.reference_name.clone(),
            start: request.start,
            allele: request.allele.clone(),
            dataset_ids: request.dataset_ids.join(","),
            outcome,
        }
    }

    /// Whether the request was rejected because of bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self.outcome, BeaconOutcome::ErrorMessage(_))
    }
}

/// Translate `request` into the filter set of its existence check.
///
/// `INDEL` (in any case) matches indels starting at the position, any other
/// allele matches the exact single-position alternate allele.  The variant
/// must have been seen in one of the requested datasets, so `None` is
/// returned for an empty dataset list as nothing can match.
pub fn filter_set(request: &BeaconRequest) -> Option<FilterSet> {
    if request.dataset_ids.is_empty() {
        return None;
    }
    let locus = if request.allele.eq_ignore_ascii_case(INDEL_ALLELE) {
        LocusFilter {
            chromosome: request.reference_name.clone(),
            start: request.start,
            end: None,
            variant_type: Some(VariantType::Indel),
            alternate: None,
        }
    } else {
        LocusFilter {
            chromosome: request.reference_name.clone(),
            start: request.start,
            end: Some(request.start),
            variant_type: None,
            alternate: Some(request.allele.clone()),
        }
    };
    Some(FilterSet {
        locus: Some(locus),
        studies: request.dataset_ids.clone(),
        ..Default::default()
    })
}

/// Answers `BeaconRequest`s with an existence check.
#[derive(Debug, Clone, Copy)]
pub struct BeaconTranslator<'a> {
    executor: QueryExecutor<'a>,
}

impl<'a> BeaconTranslator<'a> {
    pub fn new(executor: QueryExecutor<'a>) -> Self {
        Self { executor }
    }

    /// Answer `request`.
    ///
    /// A negative position yields an error response and an empty dataset
    /// list a negative answer, both without touching the storage.  Storage
    /// failures are returned as `Err`.
    pub fn answer(&self, request: &BeaconRequest) -> Result<BeaconResponse, QueryError> {
        if request.start < 0 {
            let err = QueryError::InvalidPositionInput(request.start);
            tracing::warn!("rejecting beacon request: {}", &err);
            return Ok(BeaconResponse::new(
                request,
                BeaconOutcome::ErrorMessage(err.to_string()),
            ));
        }

        let exists = match filter_set(request) {
            Some(filter_set) => self.executor.exists(&filter_set)?,
            None => {
                tracing::debug!("no dataset requested, nothing can match");
                false
            }
        };
        tracing::debug!("beacon {:?} -> exists = {}", request, exists);
        Ok(BeaconResponse::new(request, BeaconOutcome::Exists(exists)))
    }
}

/// Command line arguments for `beacon` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Answer a beacon presence query", long_about = None)]
pub struct Args {
    /// Path to the JSON lines variant collection (may be gzip-compressed).
    #[arg(long, required = true)]
    pub path_db: String,
    /// Chromosome name.
    #[arg(long)]
    pub reference_name: String,
    /// Position of the variant.
    #[arg(long, allow_negative_numbers = true)]
    pub start: i64,
    /// Alternate allele, or `INDEL`.
    #[arg(long)]
    pub allele: String,
    /// Comma-separated list of study identifiers to look in.
    #[arg(long, value_delimiter = ',')]
    pub dataset_ids: Vec<String>,
    /// Path to the output JSON file, stdout if not given.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Main entry point for `beacon` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    tracing::info!("Loading variants...");
    let before_loading = Instant::now();
    let store = InMemoryStore::load(&args.path_db)?;
    tracing::info!(
        "... done loading {} variants in {:?}",
        store.len(),
        before_loading.elapsed()
    );

    let request = BeaconRequest {
        reference_name: args.reference_name.clone(),
        start: args.start,
        allele: args.allele.clone(),
        dataset_ids: args.dataset_ids.clone(),
    };
    let response = BeaconTranslator::new(QueryExecutor::new(&store)).answer(&request)?;

    let json = serde_json::to_string_pretty(&response)?;
    if let Some(path_output) = &args.path_output {
        std::fs::write(path_output, format!("{json}\n"))?;
    } else {
        writeln!(std::io::stdout().lock(), "{json}")?;
    }

    tracing::info!("All of `beacon` completed in {:?}", before_anything.elapsed());
    if let BeaconOutcome::ErrorMessage(msg) = &response.outcome {
        anyhow::bail!("invalid beacon request: {}", msg);
    }
    Ok(())
}
