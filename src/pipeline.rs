//! End-to-end search: load, encode, score, reduce, report.
//!
//! Stages run one after another and any failure ends the run before the
//! report is written. Progress is emitted as `tracing` events; callers decide
//! where they go by installing a subscriber.

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chem::fingerprint::{
    Fingerprinter, MorganFingerprinter, SimilarityMetric, Tanimoto, DEFAULT_N_BITS, DEFAULT_RADIUS,
};
use crate::core::types::MoleculeFormat;
use crate::matching::{encode, reduce, EncodeError, SimilarityMatrix};
use crate::parsing::{self, LoadError};
use crate::report::{Report, ReportError, DEFAULT_OUTPUT, DEFAULT_PRECISION};
use crate::utils::validation::{count_to_f64, validate_output_path, ValidationError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    InvalidOutput(#[from] ValidationError),
}

/// Morgan fingerprint parameters shared by both collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintParams {
    pub radius: u32,
    pub n_bits: usize,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            n_bits: DEFAULT_N_BITS,
        }
    }
}

impl FingerprintParams {
    #[must_use]
    pub fn fingerprinter(&self) -> MorganFingerprinter {
        MorganFingerprinter::new(self.radius, self.n_bits)
    }
}

/// Everything a search run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub input: PathBuf,
    /// Overrides the format implied by the `input` extension
    pub input_format: Option<MoleculeFormat>,
    pub database: PathBuf,
    /// Overrides the format implied by the `database` extension
    pub database_format: Option<MoleculeFormat>,
    pub output: PathBuf,
    pub fingerprint: FingerprintParams,
    /// Decimals in the score column
    pub precision: usize,
}

impl SearchConfig {
    /// Config with default output, fingerprint and precision settings
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            input_format: None,
            database: database.into(),
            database_format: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            fingerprint: FingerprintParams::default(),
            precision: DEFAULT_PRECISION,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Wall time spent in each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub load_secs: f64,
    pub encode_secs: f64,
    pub matrix_secs: f64,
    pub reduce_secs: f64,
    pub write_secs: f64,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub input: PathBuf,
    pub database: PathBuf,
    pub output: PathBuf,
    pub query_count: usize,
    pub query_skipped: usize,
    pub database_count: usize,
    pub database_skipped: usize,
    pub fingerprint: FingerprintParams,
    pub report: Report,
    pub timings: StageTimings,
}

impl SearchSummary {
    /// Number of queries that received a best match
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.report.len()
    }

    /// Mean best-match score, `None` when nothing matched
    #[must_use]
    pub fn mean_score(&self) -> Option<f64> {
        if self.report.is_empty() {
            return None;
        }
        let total: f64 = self.report.rows.iter().map(|r| r.score).sum();
        Some(total / count_to_f64(self.report.len()))
    }
}

/// Run a search with Morgan fingerprints and Tanimoto similarity
///
/// # Errors
///
/// Returns the `PipelineError` of the first stage that fails. No report is
/// written in that case.
pub fn run(config: &SearchConfig) -> Result<SearchSummary, PipelineError> {
    run_with(config, &config.fingerprint.fingerprinter(), &Tanimoto)
}

/// Run a search with an explicit fingerprinter and metric
///
/// # Errors
///
/// See [`run`].
pub fn run_with<F, M>(
    config: &SearchConfig,
    fingerprinter: &F,
    metric: &M,
) -> Result<SearchSummary, PipelineError>
where
    F: Fingerprinter + ?Sized,
    M: SimilarityMetric + ?Sized,
{
    info!("Input file: {}", config.input.display());
    info!("Database file: {}", config.database.display());
    info!("Output file: {}", config.output.display());

    let mut timings = StageTimings::default();

    // The query is resolved and loaded before the database is read
    let query_format = parsing::resolve_format(&config.input, config.input_format)?;
    validate_output_path(
        &config.output,
        &[config.input.as_path(), config.database.as_path()],
    )?;

    let started = Instant::now();
    let query = parsing::load(&config.input, query_format)?;
    let database_format = parsing::resolve_format(&config.database, config.database_format)?;
    let database = parsing::load(&config.database, database_format)?;
    timings.load_secs = log_stage("load", started);

    info!("Number of molecules in the input file: {}", query.len());
    info!("Number of molecules in the database file: {}", database.len());
    if database.is_empty() {
        warn!(
            "Database {} has no molecules; the report will only contain the header",
            config.database.display()
        );
    }

    let started = Instant::now();
    let query_fps = encode(&query, fingerprinter)?;
    let database_fps = encode(&database, fingerprinter)?;
    timings.encode_secs = log_stage("encode", started);

    let started = Instant::now();
    let matrix = SimilarityMatrix::build(&query_fps, &database_fps, metric);
    timings.matrix_secs = log_stage("similarity matrix", started);
    debug!("Similarity matrix shape: {:?}", matrix.shape());

    let started = Instant::now();
    let matches = reduce(&matrix);
    timings.reduce_secs = log_stage("reduce", started);

    let started = Instant::now();
    let report = Report::render(&matches, &query, &database)?;
    report.write_to_path(&config.output, config.precision)?;
    timings.write_secs = log_stage("report", started);

    info!(
        "Wrote {} best match(es) to {}",
        report.len(),
        config.output.display()
    );

    Ok(SearchSummary {
        input: config.input.clone(),
        database: config.database.clone(),
        output: config.output.clone(),
        query_count: query.len(),
        query_skipped: query.skipped,
        database_count: database.len(),
        database_skipped: database.skipped,
        fingerprint: config.fingerprint,
        report,
        timings,
    })
}

fn log_stage(stage: &str, started: Instant) -> f64 {
    let secs = started.elapsed().as_secs_f64();
    info!("Stage {stage} took {secs:.3}s");
    secs
}
