//! Batch similarity search between two molecule collections.
//!
//! The search runs as three stages:
//!
//! - [`encode`]: one fingerprint per molecule, index-aligned with the collection
//! - [`SimilarityMatrix::build`]: dense query × database score matrix
//! - [`reduce`]: best database entry per query
//!
//! ## Tie-breaking
//!
//! When several database entries share the top score for a query, the one
//! that comes first in the database file wins. Reduction is a pure function
//! of the matrix, so repeated runs give identical matches.
//!
//! ## Example
//!
//! ```rust
//! use mol_sim::chem::{MorganFingerprinter, Tanimoto};
//! use mol_sim::matching::{encode, reduce, SimilarityMatrix};
//! use mol_sim::parsing::smi::parse_smi_text;
//!
//! let query = parse_smi_text("query.smi", "CCO\tethanol\nCCC\tpropane\n").unwrap();
//! let database = parse_smi_text("db.smi", "CCO\tethanol\nCCN\tethylamine\n").unwrap();
//!
//! let morgan = MorganFingerprinter::default();
//! let matrix = SimilarityMatrix::build(
//!     &encode(&query, &morgan).unwrap(),
//!     &encode(&database, &morgan).unwrap(),
//!     &Tanimoto,
//! );
//!
//! let matches = reduce(&matrix);
//! assert_eq!(matches.len(), 2);
//! assert_eq!(matches[0].database_index, 0);
//! assert!((matches[0].score - 1.0).abs() < 1e-12);
//! ```

pub mod encoder;
pub mod matrix;
pub mod reduce;

pub use encoder::{encode, EncodeError, FingerprintSet};
pub use matrix::SimilarityMatrix;
pub use reduce::{reduce, BestMatch};
