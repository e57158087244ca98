//! Best-match report rendering and the `best_matches.csv` artefact.
//!
//! The file has a header line naming both source files, then one line per
//! query that had a database candidate, in query order:
//!
//! ```text
//! query.smi, database.sdf, similarity
//! CCO, CCO, 1.0000
//! CCC, CCN, 0.3333
//! ```

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::collection::Collection;
use crate::matching::reduce::BestMatch;

/// Default report file name
pub const DEFAULT_OUTPUT: &str = "best_matches.csv";

/// Default number of decimals in the score column
pub const DEFAULT_PRECISION: usize = 4;

const SEPARATOR: &str = ", ";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Match refers to {collection} record {index}, which does not exist")]
    MissingRecord { collection: String, index: usize },

    #[error("Cannot create output file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One rendered best match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub query_index: usize,
    pub database_index: usize,
    pub query_name: Option<String>,
    pub database_name: Option<String>,
    /// Canonical SMILES of the query molecule
    pub query: String,
    /// Canonical SMILES of the matched database molecule
    pub database: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub query_label: String,
    pub database_label: String,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Turn matches into rows, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MissingRecord` if a match points outside either
    /// collection.
    pub fn render(
        matches: &[BestMatch],
        query: &Collection,
        database: &Collection,
    ) -> Result<Self, ReportError> {
        let missing = |collection: &Collection, index: usize| ReportError::MissingRecord {
            collection: collection.label.clone(),
            index,
        };

        let rows = matches
            .iter()
            .map(|m| {
                let q = query
                    .get(m.query_index)
                    .ok_or_else(|| missing(query, m.query_index))?;
                let d = database
                    .get(m.database_index)
                    .ok_or_else(|| missing(database, m.database_index))?;
                Ok(ReportRow {
                    query_index: m.query_index,
                    database_index: m.database_index,
                    query_name: q.name.clone(),
                    database_name: d.name.clone(),
                    query: q.to_canonical_smiles(),
                    database: d.to_canonical_smiles(),
                    score: m.score,
                })
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        Ok(Self {
            query_label: query.label.clone(),
            database_label: database.label.clone(),
            rows,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header and rows as text lines, without terminators
    fn csv_lines(&self, precision: usize) -> impl Iterator<Item = String> + '_ {
        let header = format!(
            "{}{SEPARATOR}{}{SEPARATOR}similarity",
            self.query_label, self.database_label
        );
        let rows = self.rows.iter().map(move |row| {
            format!(
                "{}{SEPARATOR}{}{SEPARATOR}{:.*}",
                row.query, row.database, precision, row.score
            )
        });
        std::iter::once(header).chain(rows)
    }

    /// Write the header and rows with `precision` decimals per score
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_csv<W: Write>(&self, mut writer: W, precision: usize) -> std::io::Result<()> {
        for line in self.csv_lines(precision) {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    /// Render the CSV as a string
    #[must_use]
    pub fn to_csv_string(&self, precision: usize) -> String {
        self.csv_lines(precision).fold(String::new(), |mut out, line| {
            out.push_str(&line);
            out.push('\n');
            out
        })
    }

    /// Write the CSV to `path`, replacing any existing file.
    ///
    /// The content goes to a temporary file in the same directory first and
    /// is renamed over `path` only once fully written, so a failed write
    /// leaves no partial file behind.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Create` if the temporary file cannot be created
    /// and `ReportError::Write` if writing or the final rename fails.
    pub fn write_to_path(&self, path: &Path, precision: usize) -> Result<(), ReportError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| ReportError::Create {
            dir: dir.clone(),
            source,
        })?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            self.write_csv(&mut writer, precision).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }

        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
