//! Loaders that turn molecule files into ordered [`Collection`]s.
//!
//! This module provides loaders for:
//!
//! - **Structure-data files (.sdf)**: MDL V2000 records separated by `$$$$`
//! - **SMILES files (.smi)**: one record per line, tab-delimited, SMILES in
//!   column 0 and an optional identifier in column 1, no header row
//!
//! The format is chosen by the caller (usually from the file extension via
//! [`resolve_format`]), never by sniffing content.
//!
//! Records that fail to parse are skipped: the load carries on and the
//! resulting collection keeps file order of the records that did parse. The
//! number of dropped records is kept on [`Collection::skipped`].
//!
//! ## Example
//!
//! ```rust
//! use mol_sim::parsing::smi::parse_smi_text;
//!
//! let text = "CCO\tethanol\nnot-a-molecule\tbroken\nCCN\tethylamine\n";
//! let collection = parse_smi_text("demo.smi", text).unwrap();
//!
//! assert_eq!(collection.len(), 2);
//! assert_eq!(collection.skipped, 1);
//! assert_eq!(collection.get(1).unwrap().name.as_deref(), Some("ethylamine"));
//! ```

pub mod sdf;
pub mod smi;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::collection::Collection;
use crate::core::types::MoleculeFormat;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: {path} (expected .sdf or .smi)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Too many records: {0} exceeds maximum allowed (1000000)")]
    TooManyRecords(usize),
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a file as text. Invalid UTF-8 sequences are replaced with U+FFFD and
/// left for the record parsers to reject or carry.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read.
pub(crate) fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!("{} contains invalid UTF-8; decoding lossily", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Pick the format for `path`: an explicit override wins, otherwise the
/// file extension decides.
///
/// # Errors
///
/// Returns `LoadError::UnsupportedFormat` naming the path when there is no
/// override and the extension is neither `.sdf` nor `.smi`.
pub fn resolve_format(
    path: &Path,
    declared: Option<MoleculeFormat>,
) -> Result<MoleculeFormat, LoadError> {
    declared
        .or_else(|| MoleculeFormat::from_path(path))
        .ok_or_else(|| LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
}

/// Load every parseable record of `path` in file order.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, or
/// `LoadError::TooManyRecords` if the record limit is exceeded. Individual
/// records that fail to parse are skipped, not reported as errors.
pub fn load(path: &Path, format: MoleculeFormat) -> Result<Collection, LoadError> {
    debug!("Loading {} as {}", path.display(), format);

    let collection = match format {
        MoleculeFormat::Sdf => sdf::parse_sdf_file(path)?,
        MoleculeFormat::Smi => smi::parse_smi_file(path)?,
    };

    if collection.skipped > 0 {
        warn!(
            "Skipped {} unparseable record(s) in {}",
            collection.skipped,
            path.display()
        );
    }
    info!(
        "Loaded {} molecule(s) from {}",
        collection.len(),
        path.display()
    );

    Ok(collection)
}
