//! Loader for structure-data (.sdf) files.
//!
//! Records are molfile blocks terminated by a `$$$$` line. A trailing record
//! without the terminator is still read. Each block goes to
//! [`parse_mol_block`]; blocks that fail to parse, or that describe a molecule
//! with no atoms, are skipped.

use std::path::Path;

use tracing::debug;

use crate::chem::sdf::parse_mol_block;
use crate::core::collection::Collection;
use crate::parsing::{read_text, LoadError};
use crate::utils::validation::check_record_limit;

const RECORD_TERMINATOR: &str = "$$$$";

/// Parse a structure-data file
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, or
/// `LoadError::TooManyRecords` if the limit is exceeded.
pub fn parse_sdf_file(path: &Path) -> Result<Collection, LoadError> {
    let content = read_text(path)?;
    parse_sdf_text(Collection::label_for(path), &content)
}

/// Parse structure-data text into a collection labelled `label`
///
/// # Errors
///
/// Returns `LoadError::TooManyRecords` if the limit is exceeded.
pub fn parse_sdf_text(label: impl Into<String>, text: &str) -> Result<Collection, LoadError> {
    let mut molecules = Vec::new();
    let mut skipped = 0;

    for (index, block) in split_records(text).into_iter().enumerate() {
        let record = index + 1;
        match parse_mol_block(&block) {
            Ok(mol) if mol.is_empty() => {
                debug!("Skipping SDF record {record}: no atoms");
                skipped += 1;
            }
            Ok(mol) => {
                // Check record limit for DOS protection
                if check_record_limit(molecules.len()).is_some() {
                    return Err(LoadError::TooManyRecords(molecules.len()));
                }
                molecules.push(mol);
            }
            Err(e) => {
                debug!("Skipping SDF record {record}: {e}");
                skipped += 1;
            }
        }
    }

    Ok(Collection::new(label, molecules).with_skipped(skipped))
}

/// Split on `$$$$` lines, dropping whitespace-only trailing content
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim_end() == RECORD_TERMINATOR {
            records.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }

    if !current.trim().is_empty() {
        records.push(current);
    }
    records
}
