//! Loader for SMILES (.smi) files.
//!
//! One record per line, no header row. Columns are tab-delimited: SMILES in
//! column 0, identifier in column 1, anything further is ignored. Lines with
//! no tab are split on the first run of whitespace instead. Blank lines and
//! lines starting with `#` are not records.

use std::path::Path;

use tracing::debug;

use crate::chem::smiles::parse_smiles_named;
use crate::core::collection::Collection;
use crate::parsing::{read_text, LoadError};
use crate::utils::validation::check_record_limit;

/// Parse a SMILES file
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, or
/// `LoadError::TooManyRecords` if the limit is exceeded.
pub fn parse_smi_file(path: &Path) -> Result<Collection, LoadError> {
    let content = read_text(path)?;
    parse_smi_text(Collection::label_for(path), &content)
}

/// Parse SMILES text into a collection labelled `label`
///
/// # Errors
///
/// Returns `LoadError::TooManyRecords` if the limit is exceeded.
pub fn parse_smi_text(label: impl Into<String>, text: &str) -> Result<Collection, LoadError> {
    let mut molecules = Vec::new();
    let mut skipped = 0;

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (smiles, name) = split_columns(line);
        match parse_smiles_named(smiles, name) {
            Ok(mol) => {
                // Check record limit for DOS protection
                if check_record_limit(molecules.len()).is_some() {
                    return Err(LoadError::TooManyRecords(molecules.len()));
                }
                molecules.push(mol);
            }
            Err(e) => {
                debug!("Skipping SMILES record at line {}: {e}", line_number + 1);
                skipped += 1;
            }
        }
    }

    Ok(Collection::new(label, molecules).with_skipped(skipped))
}

fn split_columns(line: &str) -> (&str, Option<&str>) {
    let mut fields = if line.contains('\t') {
        line.splitn(3, '\t').collect::<Vec<_>>()
    } else {
        line.splitn(2, char::is_whitespace).collect::<Vec<_>>()
    }
    .into_iter()
    .map(str::trim);

    let smiles = fields.next().unwrap_or_default();
    let name = fields.next().filter(|n| !n.is_empty());
    (smiles, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_smi_text() {
        let smi = "CCO\tethanol\nCCN\tethylamine\textra\tcolumns\nc1ccccc1\n";

        let collection = parse_smi_text("query.smi", smi).unwrap();
        assert_eq!(collection.label, "query.smi");
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.skipped, 0);

        assert_eq!(collection.get(0).unwrap().name.as_deref(), Some("ethanol"));
        assert_eq!(collection.get(1).unwrap().name.as_deref(), Some("ethylamine"));
        assert!(collection.get(2).unwrap().name.is_none());
        assert_eq!(collection.get(2).unwrap().to_canonical_smiles(), "c1ccccc1");
    }

    #[test]
    fn test_malformed_records_are_skipped_in_order() {
        let smi = "C1CC\tunclosed\nCCO\tfirst\nXx\tunknown\nCCC\tsecond\nC(C\tparen\n";

        let collection = parse_smi_text("query.smi", smi).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.skipped, 3);
        let names: Vec<_> = collection.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_blank_and_comment_lines_are_not_records() {
        let smi = "# generated\n\nCCO\tethanol\n   \n# trailing comment\n";

        let collection = parse_smi_text("query.smi", smi).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.skipped, 0);
    }

    #[test]
    fn test_uncommon_elements_are_kept() {
        let smi = "[Pd]\tpalladium\n[Gd+3]\tgadolinium\nCC[Ge](C)(C)C\tgermane\n\
                   [Ti]\nC[Sb]\n*C\tattachment\n";

        let collection = parse_smi_text("query.smi", smi).unwrap();
        assert_eq!(collection.len(), 6);
        assert_eq!(collection.skipped, 0);
    }

    #[test]
    fn test_whitespace_fallback() {
        let collection = parse_smi_text("query.smi", "CCO ethanol\nCCC   propane\n").unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(1).unwrap().name.as_deref(), Some("propane"));
    }

    #[test]
    fn test_parse_smi_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".smi").tempfile().unwrap();
        writeln!(file, "CCO\tethanol").unwrap();
        writeln!(file, "CC(=O)O\tacetic acid").unwrap();
        file.flush().unwrap();

        let collection = parse_smi_file(file.path()).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(1).unwrap().name.as_deref(), Some("acetic acid"));
        assert!(collection.label.ends_with(".smi"));
    }

    #[test]
    fn test_invalid_utf8_only_affects_its_record() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".smi").tempfile().unwrap();
        file.write_all(b"CCO\tethanol\nCCN\tcaf\xe9\nC\xffC\tbroken\nCCC\tpropane\n")
            .unwrap();
        file.flush().unwrap();

        let collection = parse_smi_file(file.path()).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.skipped, 1);
        assert_eq!(collection.get(1).unwrap().name.as_deref(), Some("caf\u{FFFD}"));
        assert_eq!(collection.get(2).unwrap().name.as_deref(), Some("propane"));
    }
}
