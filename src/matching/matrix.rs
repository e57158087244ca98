//! Dense all-pairs similarity matrix.

use crate::chem::fingerprint::SimilarityMetric;
use crate::matching::encoder::FingerprintSet;

/// `rows × cols` similarity scores stored row-major.
///
/// Row `i` is query fingerprint `i`, column `j` is database fingerprint `j`.
/// Either dimension may be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Score every query fingerprint against every database fingerprint.
    ///
    /// The metric is called exactly once per cell, with the query
    /// fingerprint first.
    #[must_use]
    pub fn build<M>(query: &FingerprintSet, database: &FingerprintSet, metric: &M) -> Self
    where
        M: SimilarityMetric + ?Sized,
    {
        let rows = query.len();
        let cols = database.len();
        let mut data = Vec::with_capacity(rows.saturating_mul(cols));

        for q in query.iter() {
            for d in database.iter() {
                data.push(metric.similarity(q, d));
            }
        }

        Self { rows, cols, data }
    }

    /// Wrap precomputed row-major scores. Returns `None` when `data` does
    /// not hold exactly `rows * cols` values.
    #[must_use]
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (rows.checked_mul(cols) == Some(data.len())).then_some(Self { rows, cols, data })
    }

    /// `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Scores of one query against every database entry
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// All rows in query order; yields one empty slice per row when there are no columns
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |row| &self.data[row * self.cols..(row + 1) * self.cols])
    }
}
