//! Z-score standardization of feature columns
//!
//! Each column is shifted by its mean and divided by its population
//! standard deviation so that features with different natural ranges
//! (loudness in dB, tempo in BPM, probabilities in [0, 1]) weigh the same.
//! A column whose values are all identical standardizes to exactly 0.

use tunematch_core::{Error, FeatureMatrix, Result};

/// Per-column mean and standard deviation fitted on one catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl Standardizer {
    /// Fit column statistics
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        if matrix.cols() == 0 {
            return Err(Error::NoFeatures);
        }
        if matrix.rows() == 0 {
            return Err(Error::EmptyCatalog);
        }

        let n = matrix.rows() as f64;
        let mut means = Vec::with_capacity(matrix.cols());
        let mut std_devs = Vec::with_capacity(matrix.cols());

        for col in 0..matrix.cols() {
            let values: Vec<f64> = matrix.column(col).collect();
            let mean = values.iter().sum::<f64>() / n;

            // Exact constancy check: the mean of a constant column can carry
            // rounding error that would otherwise survive as a tiny variance.
            let first = values[0];
            let std_dev = if values.iter().all(|v| *v == first) {
                0.0
            } else {
                let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                variance.sqrt()
            };

            means.push(mean);
            std_devs.push(std_dev);
        }

        Ok(Self { means, std_devs })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    /// Whether the column had zero variance when fitted
    pub fn is_constant(&self, col: usize) -> bool {
        self.std_devs[col] == 0.0
    }

    /// Standardize a single value of column `col`
    #[inline]
    pub fn transform_value(&self, col: usize, value: f64) -> f64 {
        let std_dev = self.std_devs[col];
        if std_dev > 0.0 {
            (value - self.means[col]) / std_dev
        } else {
            0.0
        }
    }

    /// Standardize a matrix with the fitted statistics
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        if matrix.cols() != self.means.len() {
            return Err(Error::InvalidDimension {
                expected: self.means.len(),
                actual: matrix.cols(),
            });
        }

        let mut out = FeatureMatrix::zeros(matrix.rows(), matrix.cols());
        for row in 0..matrix.rows() {
            let source = matrix.row(row);
            let target = out.row_mut(row);
            for (col, (t, v)) in target.iter_mut().zip(source.iter()).enumerate() {
                *t = self.transform_value(col, *v);
            }
        }
        Ok(out)
    }
}

/// Fit and transform in one step
pub fn standardize(matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
    Standardizer::fit(matrix)?.transform(matrix)
}
