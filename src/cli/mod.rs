//! Command-line interface for mol-sim.
//!
//! A single command: find the most similar database molecule for every
//! query molecule and write `best_matches.csv`.
//!
//! ## Usage
//!
//! ```text
//! # SDF queries against a SMILES database
//! mol-sim --input queries.sdf --database library.smi
//!
//! # Custom output path and fingerprint settings
//! mol-sim --input q.smi --database db.sdf --output hits.csv --radius 3 --n-bits 4096
//!
//! # JSON summary (includes every best match) for scripting
//! mol-sim --input q.smi --database db.smi --format json
//! ```
//!
//! `--help` prints usage and exits with status 1.

use clap::Parser;

pub mod search;

#[derive(Parser)]
#[command(name = "mol-sim")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Find the most similar database molecule for each query molecule")]
#[command(
    long_about = "mol-sim compares every molecule of a query file against every molecule of a database file.\n\nBoth files may be SDF (.sdf) or tab-delimited SMILES (.smi). Molecules are encoded as Morgan fingerprints and compared by Tanimoto similarity. For each query the best scoring database molecule is written to a CSV report; ties go to the molecule that comes first in the database file."
)]
pub struct Cli {
    #[command(flatten)]
    pub search: search::SearchArgs,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format of the run summary printed to stdout
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MoleculeFormat;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["mol-sim", "--input", "q.smi", "--database", "d.sdf"]).unwrap();
        assert_eq!(cli.search.input.to_str(), Some("q.smi"));
        assert_eq!(cli.search.database.to_str(), Some("d.sdf"));
        assert_eq!(cli.search.output.to_str(), Some("best_matches.csv"));
        assert_eq!(cli.search.radius, 2);
        assert_eq!(cli.search.n_bits, 2048);
        assert_eq!(cli.search.precision, 4);
        assert!(!cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "mol-sim",
            "--input",
            "q.txt",
            "--input-format",
            "smi",
            "--database",
            "d.txt",
            "--database-format",
            "sdf",
            "--radius",
            "3",
            "--n-bits",
            "1024",
            "-f",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.search.input_format, Some(MoleculeFormat::Smi));
        assert_eq!(cli.search.database_format, Some(MoleculeFormat::Sdf));
        assert_eq!(cli.search.radius, 3);
        assert_eq!(cli.search.n_bits, 1024);
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_usage_errors() {
        let missing = Cli::try_parse_from(["mol-sim", "--input", "q.smi"]);
        assert_eq!(
            missing.err().map(|e| e.kind()),
            Some(ErrorKind::MissingRequiredArgument)
        );

        let out_of_range =
            Cli::try_parse_from(["mol-sim", "--input", "q", "--database", "d", "--n-bits", "8"]);
        assert_eq!(
            out_of_range.err().map(|e| e.kind()),
            Some(ErrorKind::ValueValidation)
        );

        let help = Cli::try_parse_from(["mol-sim", "--help"]);
        assert_eq!(help.err().map(|e| e.kind()), Some(ErrorKind::DisplayHelp));
    }
}
