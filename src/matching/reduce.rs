//! Best-match reduction of a similarity matrix.

use serde::Serialize;

use crate::matching::matrix::SimilarityMatrix;

/// The highest-scoring database entry for one query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestMatch {
    pub query_index: usize,
    pub database_index: usize,
    pub score: f64,
}

/// One [`BestMatch`] per row that has at least one column, in row order.
///
/// Each row is scanned left to right and a column replaces the current best
/// only if its score is strictly greater, so ties go to the lowest column
/// index. A NaN score never wins over a number. Rows with no columns (an
/// empty database) produce no match.
#[must_use]
pub fn reduce(matrix: &SimilarityMatrix) -> Vec<BestMatch> {
    matrix
        .rows()
        .enumerate()
        .filter_map(|(query_index, row)| {
            first_max(row).map(|(database_index, score)| BestMatch {
                query_index,
                database_index,
                score,
            })
        })
        .collect()
}

fn first_max(row: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (col, &score) in row.iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, current)) => score > current || (current.is_nan() && !score.is_nan()),
        };
        if better {
            best = Some((col, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize, data: &[f64]) -> SimilarityMatrix {
        SimilarityMatrix::from_row_major(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn test_reduce_picks_row_maximum() {
        let m = matrix(2, 3, &[0.1, 0.9, 0.3, 0.7, 0.2, 0.8]);
        let matches = reduce(&m);

        assert_eq!(
            matches,
            vec![
                BestMatch { query_index: 0, database_index: 1, score: 0.9 },
                BestMatch { query_index: 1, database_index: 2, score: 0.8 },
            ]
        );
    }

    #[test]
    fn test_ties_go_to_lowest_column() {
        let m = matrix(3, 4, &[
            0.5, 0.5, 0.5, 0.5, // all tied
            0.1, 0.6, 0.2, 0.6, // tie on the max
            0.0, 0.0, 0.0, 0.0, // all zero
        ]);
        let matches = reduce(&m);

        assert_eq!(matches[0].database_index, 0);
        assert_eq!(matches[1].database_index, 1);
        assert_eq!(matches[2].database_index, 0);
        assert_eq!(matches[2].score, 0.0);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let m = matrix(2, 3, &[0.3, 0.3, 0.1, 1.0, 0.4, 1.0]);
        let first = reduce(&m);
        for _ in 0..5 {
            assert_eq!(reduce(&m), first);
        }
    }

    #[test]
    fn test_score_is_row_maximum() {
        let m = matrix(3, 3, &[0.2, 0.4, 0.1, 0.9, 0.9, 0.3, 0.05, 0.0, 0.5]);
        for best in reduce(&m) {
            let row = m.row(best.query_index).unwrap();
            let max = row.iter().copied().fold(f64::MIN, f64::max);
            assert_eq!(best.score, max);
            assert_eq!(row.iter().position(|&s| s == max), Some(best.database_index));
        }
    }

    #[test]
    fn test_empty_database_yields_no_matches() {
        assert!(reduce(&matrix(3, 0, &[])).is_empty());
        assert!(reduce(&matrix(0, 3, &[])).is_empty());
        assert!(reduce(&matrix(0, 0, &[])).is_empty());
    }

    #[test]
    fn test_nan_never_wins() {
        let m = matrix(2, 3, &[f64::NAN, 0.2, 0.4, 0.3, f64::NAN, 0.3]);
        let matches = reduce(&m);
        assert_eq!(matches[0].database_index, 2);
        assert_eq!(matches[1].database_index, 0);
    }
}
