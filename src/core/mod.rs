//! Core data types shared by every pipeline stage.
//!
//! - [`Molecule`]: a parsed molecular graph (atoms, bonds, title, SD properties)
//! - [`Collection`]: the ordered molecules of one input file plus its label
//! - [`MoleculeFormat`]: the file formats the loader dispatches on
//!
//! Collections are created once by the loader and never mutated afterwards.
//! The index of a molecule in its collection is its row or column in the
//! similarity matrix.
//!
//! [`Molecule`]: molecule::Molecule
//! [`Collection`]: collection::Collection
//! [`MoleculeFormat`]: types::MoleculeFormat

pub mod collection;
pub mod molecule;
pub mod types;
