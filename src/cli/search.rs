use std::path::PathBuf;

use clap::Args;

use crate::chem::fingerprint::DEFAULT_RADIUS;
use crate::cli::OutputFormat;
use crate::core::types::MoleculeFormat;
use crate::pipeline::{self, FingerprintParams, SearchConfig, SearchSummary};
use crate::report::DEFAULT_OUTPUT;

#[derive(Args)]
pub struct SearchArgs {
    /// Query molecules (.sdf or .smi)
    #[arg(long, required = true)]
    pub input: PathBuf,

    /// Query format (taken from the file extension by default)
    #[arg(long)]
    pub input_format: Option<MoleculeFormat>,

    /// Database molecules to search (.sdf or .smi)
    #[arg(long, required = true)]
    pub database: PathBuf,

    /// Database format (taken from the file extension by default)
    #[arg(long)]
    pub database_format: Option<MoleculeFormat>,

    /// Report file to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Morgan fingerprint radius
    #[arg(long, default_value_t = DEFAULT_RADIUS, value_parser = clap::value_parser!(u32).range(0..=6))]
    pub radius: u32,

    /// Fingerprint width in bits
    #[arg(long, default_value_t = 2048, value_parser = clap::value_parser!(u32).range(64..=16384))]
    pub n_bits: u32,

    /// Decimal places of the similarity column
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=12))]
    pub precision: u32,
}

impl SearchArgs {
    /// Convert parsed arguments into a pipeline config
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric option does not fit the platform's `usize`.
    pub fn to_config(&self) -> anyhow::Result<SearchConfig> {
        Ok(SearchConfig {
            input: self.input.clone(),
            input_format: self.input_format,
            database: self.database.clone(),
            database_format: self.database_format,
            output: self.output.clone(),
            fingerprint: FingerprintParams {
                radius: self.radius,
                n_bits: usize::try_from(self.n_bits)?,
            },
            precision: usize::try_from(self.precision)?,
        })
    }
}

/// Execute the similarity search
///
/// # Errors
///
/// Returns an error if an input cannot be loaded, a molecule cannot be
/// fingerprinted, or the report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SearchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.to_config()?;
    let summary = pipeline::run(&config)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary, config.precision, verbose),
        OutputFormat::Json => print_json_summary(&summary)?,
        OutputFormat::Tsv => print_tsv_summary(&summary, config.precision),
    }

    Ok(())
}

fn print_text_summary(summary: &SearchSummary, precision: usize, verbose: bool) {
    println!(
        "Input file: {} ({} molecules, {} skipped)",
        summary.input.display(),
        summary.query_count,
        summary.query_skipped
    );
    println!(
        "Database file: {} ({} molecules, {} skipped)",
        summary.database.display(),
        summary.database_count,
        summary.database_skipped
    );
    println!("Output file: {}", summary.output.display());
    println!();

    if summary.database_count == 0 {
        println!("Database is empty: no best matches were written.");
    } else {
        println!("Best matches written: {}", summary.match_count());
    }
    if let Some(mean) = summary.mean_score() {
        println!("Mean similarity: {mean:.precision$}");
    }

    if verbose {
        let t = &summary.timings;
        println!();
        println!(
            "Fingerprint: Morgan radius {}, {} bits",
            summary.fingerprint.radius, summary.fingerprint.n_bits
        );
        println!("Timings:");
        println!("  Load:     {:.3}s", t.load_secs);
        println!("  Encode:   {:.3}s", t.encode_secs);
        println!("  Matrix:   {:.3}s", t.matrix_secs);
        println!("  Reduce:   {:.3}s", t.reduce_secs);
        println!("  Report:   {:.3}s", t.write_secs);
    }
}

fn print_json_summary(summary: &SearchSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn print_tsv_summary(summary: &SearchSummary, precision: usize) {
    println!(
        "query_index\tquery_name\tquery_smiles\tdatabase_index\tdatabase_name\tdatabase_smiles\tsimilarity"
    );
    for row in &summary.report.rows {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.precision$}",
            row.query_index,
            row.query_name.as_deref().unwrap_or("-"),
            row.query,
            row.database_index,
            row.database_name.as_deref().unwrap_or("-"),
            row.database,
            row.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SearchArgs {
        SearchArgs {
            input: PathBuf::from("q.smi"),
            input_format: None,
            database: PathBuf::from("d.sdf"),
            database_format: Some(MoleculeFormat::Smi),
            output: PathBuf::from(DEFAULT_OUTPUT),
            radius: DEFAULT_RADIUS,
            n_bits: 1024,
            precision: 6,
        }
    }

    #[test]
    fn test_to_config() {
        let config = args().to_config().unwrap();
        assert_eq!(config.input, PathBuf::from("q.smi"));
        assert_eq!(config.database_format, Some(MoleculeFormat::Smi));
        assert_eq!(config.fingerprint.radius, DEFAULT_RADIUS);
        assert_eq!(config.fingerprint.n_bits, 1024);
        assert_eq!(config.precision, 6);
    }

    #[test]
    fn test_cli_defaults_match_library_defaults() {
        use crate::cli::Cli;
        use clap::Parser;

        let cli = Cli::try_parse_from(["mol-sim", "--input", "q.smi", "--database", "d.smi"]).unwrap();
        assert_eq!(
            cli.search.to_config().unwrap(),
            SearchConfig::new("q.smi", "d.smi")
        );
    }
}
