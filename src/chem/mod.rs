//! Small cheminformatics toolkit backing the search pipeline.
//!
//! The pipeline only ever talks to this module through these operations:
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | parse one SMILES record | [`smiles::parse_smiles_named`] |
//! | parse one molfile record | [`sdf::parse_mol_block`] |
//! | perceive aromatic rings | [`aromaticity::set_aromaticity`] (run by both readers) |
//! | fingerprint a molecule | [`Fingerprinter::fingerprint`] |
//! | compare two fingerprints | [`SimilarityMetric::similarity`] |
//! | canonical text | [`canon::canonical_smiles`] |
//!
//! Fingerprinting and similarity are traits so stages can be driven with
//! deterministic stand-ins in tests.
//!
//! ## Example
//!
//! ```rust
//! use mol_sim::chem::{parse_smiles, Fingerprinter, MorganFingerprinter, SimilarityMetric, Tanimoto};
//!
//! let ethanol = parse_smiles("CCO").unwrap();
//! let methanol = parse_smiles("CO").unwrap();
//!
//! let morgan = MorganFingerprinter::default();
//! let a = morgan.fingerprint(&ethanol).unwrap();
//! let b = morgan.fingerprint(&methanol).unwrap();
//!
//! let score = Tanimoto.similarity(&a, &b);
//! assert!((0.0..1.0).contains(&score));
//! assert_eq!(ethanol.to_canonical_smiles(), "CCO");
//! ```

pub mod aromaticity;
pub mod canon;
pub mod element;
pub mod fingerprint;
pub mod sdf;
pub mod smiles;

pub use aromaticity::{find_aromatic_atoms, set_aromaticity};
pub use canon::canonical_smiles;
pub use fingerprint::{
    BitVector, FingerprintError, Fingerprinter, MorganFingerprinter, SimilarityMetric, Tanimoto,
};
pub use sdf::{parse_mol_block, MolBlockError};
pub use smiles::{parse_smiles, parse_smiles_named, SmilesError};
