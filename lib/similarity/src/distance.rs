//! Cosine similarity over standardized feature rows
//!
//! Scores are in [-1.0, 1.0]. A zero vector has similarity 0 with
//! everything, including itself.

use rayon::prelude::*;
use tunematch_core::matrix::{dot, norm, normalize};
use tunematch_core::{Error, FeatureMatrix, Result};

/// Catalogs at least this large are scored on the rayon pool
const PARALLEL_THRESHOLD: usize = 4096;

/// Cosine similarity between two vectors
///
/// Returns 0 when either norm is 0 or the lengths differ.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Scores one row of a matrix against every row
///
/// Rows are scaled to unit length once at construction, so each query
/// costs one dot product per row.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    unit_rows: FeatureMatrix,
    nonzero: Vec<bool>,
}

impl SimilarityScorer {
    pub fn new(standardized: &FeatureMatrix) -> Self {
        let mut unit_rows = standardized.clone();
        let nonzero = (0..unit_rows.rows())
            .map(|row| normalize(unit_rows.row_mut(row)))
            .collect();
        Self { unit_rows, nonzero }
    }

    pub fn len(&self) -> usize {
        self.unit_rows.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_rows.rows() == 0
    }

    /// Row scaled to unit length (all zeros for a zero row)
    pub fn unit_row(&self, row: usize) -> &[f64] {
        self.unit_rows.row(row)
    }

    /// Similarity between two rows
    #[inline]
    pub fn score_pair(&self, a: usize, b: usize) -> f64 {
        if !self.nonzero[a] || !self.nonzero[b] {
            return 0.0;
        }
        dot(self.unit_rows.row(a), self.unit_rows.row(b)).clamp(-1.0, 1.0)
    }

    /// Similarity of `query_row` with every row, in row order
    pub fn score(&self, query_row: usize) -> Result<Vec<f64>> {
        let n = self.len();
        if query_row >= n {
            return Err(Error::RowOutOfRange {
                index: query_row,
                len: n,
            });
        }

        let scores = if n >= PARALLEL_THRESHOLD {
            (0..n)
                .into_par_iter()
                .map(|row| self.score_pair(query_row, row))
                .collect()
        } else {
            (0..n).map(|row| self.score_pair(query_row, row)).collect()
        };
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let cols = rows[0].len();
        FeatureMatrix::from_rows(rows, cols).unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 1.0], &[-2.0, -2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_scorer_matches_cosine() {
        let m = matrix(vec![
            vec![1.0, 2.0, -0.5],
            vec![-1.0, 0.3, 2.0],
            vec![0.0, 0.0, 0.0],
            vec![2.0, 4.0, -1.0],
        ]);
        let scorer = SimilarityScorer::new(&m);
        let scores = scorer.score(0).unwrap();

        assert_eq!(scores.len(), 4);
        for (row, score) in scores.iter().enumerate() {
            let expected = cosine_similarity(m.row(0), m.row(row));
            assert!((score - expected).abs() < 1e-12);
        }
        assert_eq!(scores[2], 0.0);
        assert!((scores[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_row_scores_zero_against_everything() {
        let m = matrix(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        let scorer = SimilarityScorer::new(&m);
        assert_eq!(scorer.score(0).unwrap(), vec![0.0, 0.0]);
        assert!(scorer.score(1).unwrap().iter().all(|s| !s.is_nan()));
    }

    #[test]
    fn test_query_out_of_range() {
        let scorer = SimilarityScorer::new(&matrix(vec![vec![1.0]]));
        assert!(matches!(
            scorer.score(1),
            Err(Error::RowOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let rows: Vec<Vec<f64>> = (0..PARALLEL_THRESHOLD + 10)
            .map(|i| {
                let x = i as f64;
                vec![(x * 0.37).sin(), (x * 0.11).cos(), (x % 7.0) - 3.0]
            })
            .collect();
        let m = matrix(rows);
        let scorer = SimilarityScorer::new(&m);
        let parallel = scorer.score(5).unwrap();
        let sequential: Vec<f64> = (0..scorer.len()).map(|r| scorer.score_pair(5, r)).collect();
        assert_eq!(parallel, sequential);
    }
}
