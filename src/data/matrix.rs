use std::sync::Arc;

use crate::error::{Result, StoreError};

use super::model::{Axis, KeyIndex};

// ---------------------------------------------------------------------------
// Matrix – dense features × samples values
// ---------------------------------------------------------------------------

/// A dense row-major matrix keyed by feature ID (rows) and sample ID (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Arc<KeyIndex>,
    cols: Arc<KeyIndex>,
    values: Vec<f64>,
}

impl Matrix {
    /// Wrap row-major `values`; the length must be `rows.len() * cols.len()`.
    pub fn new(rows: Arc<KeyIndex>, cols: Arc<KeyIndex>, values: Vec<f64>) -> Result<Self> {
        let expected = rows.len() * cols.len();
        if values.len() != expected {
            return Err(StoreError::Shape {
                rows: rows.len(),
                cols: cols.len(),
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Build from nested rows, one inner `Vec` per feature.
    pub fn from_rows(
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let row_index = Arc::new(KeyIndex::new(feature_ids)?);
        let col_index = Arc::new(KeyIndex::new(sample_ids)?);
        let n_cols = col_index.len();
        if rows.len() != row_index.len() || rows.iter().any(|r| r.len() != n_cols) {
            return Err(StoreError::Shape {
                rows: row_index.len(),
                cols: n_cols,
                expected: row_index.len() * n_cols,
                actual: rows.iter().map(Vec::len).sum(),
            });
        }
        Self::new(row_index, col_index, rows.into_iter().flatten().collect())
    }

    pub(crate) fn zeros(rows: Arc<KeyIndex>, cols: Arc<KeyIndex>) -> Self {
        let values = vec![0.0; rows.len() * cols.len()];
        Self { rows, cols, values }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn feature_ids(&self) -> &[String] {
        self.rows.keys()
    }

    pub fn sample_ids(&self) -> &[String] {
        self.cols.keys()
    }

    pub(crate) fn row_index(&self) -> &Arc<KeyIndex> {
        &self.rows
    }

    pub(crate) fn col_index(&self) -> &Arc<KeyIndex> {
        &self.cols
    }

    /// All values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, feature_id: &str, sample_id: &str) -> Result<f64> {
        let i = self
            .rows
            .position(feature_id)
            .ok_or_else(|| StoreError::key_not_found(feature_id))?;
        let j = self
            .cols
            .position(sample_id)
            .ok_or_else(|| StoreError::key_not_found(sample_id))?;
        Ok(self.values[i * self.n_cols() + j])
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        let n_cols = self.n_cols();
        self.values[row * n_cols + col] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.n_cols();
        &self.values[i * n..(i + 1) * n]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.n_rows()).map(|i| self.values[i * self.n_cols() + j]).collect()
    }

    /// Number of slices along `axis` (rows for features, columns for samples).
    pub fn len_along(&self, axis: Axis) -> usize {
        match axis {
            Axis::Feature => self.n_rows(),
            Axis::Sample => self.n_cols(),
        }
    }

    /// Apply `f` to every value, keeping the keys.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Keep the given row and column positions, in order, under the given indices.
    pub(crate) fn select(
        &self,
        row_positions: &[usize],
        col_positions: &[usize],
        rows: Arc<KeyIndex>,
        cols: Arc<KeyIndex>,
    ) -> Matrix {
        let mut values = Vec::with_capacity(row_positions.len() * col_positions.len());
        for &i in row_positions {
            let row = self.row(i);
            values.extend(col_positions.iter().map(|&j| row[j]));
        }
        Matrix { rows, cols, values }
    }
}
