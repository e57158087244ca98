//! # mol-sim
//!
//! A library for batch molecular similarity search.
//!
//! Given a file of query molecules and a file of database molecules, `mol-sim`
//! finds, for every query, the database molecule whose fingerprint is most
//! similar, and writes the pairs to a CSV report.
//!
//! ## Features
//!
//! - **Two input formats**: SDF (V2000 molfiles) and tab-delimited SMILES
//! - **Parse-or-skip loading**: malformed records are dropped and counted, never fatal
//! - **Morgan fingerprints**: circular fingerprints with configurable radius and width
//! - **Exact search**: the full query × database Tanimoto matrix is computed
//! - **Deterministic ties**: the first database molecule with the top score wins
//! - **Stable report**: rows in query order with canonical SMILES, written atomically
//!
//! ## Example
//!
//! ```rust,no_run
//! use mol_sim::pipeline::{run, SearchConfig};
//!
//! let config = SearchConfig::new("queries.sdf", "library.smi").with_output("hits.csv");
//! let summary = run(&config).unwrap();
//!
//! for row in &summary.report.rows {
//!     println!("{} -> {} ({:.3})", row.query, row.database, row.score);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`chem`]: SMILES and molfile parsing, canonical SMILES, fingerprints and Tanimoto
//! - [`core`]: Molecule and collection types
//! - [`parsing`]: Loading SDF and SMILES files into collections
//! - [`matching`]: Encoding, similarity matrix and best-match reduction
//! - [`report`]: CSV report rendering and writing
//! - [`pipeline`]: The end-to-end search
//! - [`cli`]: Command-line interface implementation

pub mod chem;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::collection::Collection;
pub use core::molecule::Molecule;
pub use core::types::MoleculeFormat;
pub use matching::{BestMatch, FingerprintSet, SimilarityMatrix};
pub use pipeline::{run, SearchConfig, SearchSummary};
pub use report::Report;
