use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dense row-major matrix of feature values
///
/// Rows are songs in catalog order, columns follow the resolved schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    #[inline]
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from row vectors; every row must have `cols` entries
    pub fn from_rows(rows: Vec<Vec<f64>>, cols: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        let n = rows.len();
        for row in rows {
            if row.len() != cols {
                return Err(Error::InvalidDimension {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { rows: n, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.cols;
        &mut self.data[start..start + self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Values of one column, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |row| self.get(row, col))
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |row| self.row(row))
    }

    /// Multiply every value of one column by `factor`
    pub fn scale_column(&mut self, col: usize, factor: f64) {
        for row in 0..self.rows {
            self.data[row * self.cols + col] *= factor;
        }
    }
}

/// Dot product of two rows of the same matrix
///
/// Both slices must have the same length.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dot product of rows with different lengths");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Scale to unit length in place; a zero vector is left untouched.
/// Returns whether the vector had a non-zero norm.
#[inline]
pub fn normalize(a: &mut [f64]) -> bool {
    let n = norm(a);
    if n > 0.0 {
        for x in a.iter_mut() {
            *x /= n;
        }
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_access() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(0).collect::<Vec<_>>(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_from_rows_dimension_mismatch() {
        let err = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]], 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_scale_column() {
        let mut m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        m.scale_column(1, 10.0);
        assert_eq!(m.row(0), &[1.0, 20.0]);
        assert_eq!(m.row(1), &[3.0, 40.0]);
    }

    #[test]
    fn test_norm_and_normalize() {
        let mut v = vec![3.0, 4.0];
        assert!((norm(&v) - 5.0).abs() < 1e-12);
        assert!(normalize(&mut v));
        assert!((norm(&v) - 1.0).abs() < 1e-12);

        let mut zero = vec![0.0, 0.0];
        assert!(!normalize(&mut zero));
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "different lengths")]
    fn test_dot_length_mismatch_panics_in_debug() {
        dot(&[1.0], &[1.0, 2.0]);
    }
}
