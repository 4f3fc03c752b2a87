//! The `Matrix` container and the scalar loops every other kernel is
//! checked against.
//!
//! A matrix is a contiguous row-major `Vec<f64>` plus its shape. Kernels
//! work on raw slices so the same code can fill a whole output or just the
//! row range a worker thread owns.

pub mod naive_ijk;
pub mod naive_ikj;
pub mod transpose;

use std::fmt;

use crate::error::{MatmulError, Result};

/// Dense row-major matrix of `f64`.
///
/// Invariant: `data.len() == rows * cols`. Zero-sized matrices can exist,
/// but every multiplication strategy rejects them.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a `rows x cols` matrix, zero-filled or from `fill`.
    ///
    /// # Errors
    ///
    /// [`MatmulError::ShapeError`] if `fill` does not hold exactly
    /// `rows * cols` values, or if that product overflows.
    pub fn new(rows: usize, cols: usize, fill: Option<Vec<f64>>) -> Result<Self> {
        match fill {
            Some(data) => Self::from_vec(rows, cols, data),
            None => Self::zeros(rows, cols),
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = element_count(rows, cols, data.len())?;
        if data.len() != expected {
            return Err(MatmulError::ShapeError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Zero-filled matrix. The buffer is reserved fallibly so a huge shape
    /// reports [`MatmulError::AllocationFailure`] instead of aborting.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let elements = element_count(rows, cols, 0)?;
        let mut data = Vec::new();
        data.try_reserve_exact(elements)
            .map_err(|_| MatmulError::AllocationFailure { elements })?;
        data.resize(elements, 0.0);
        Ok(Matrix { rows, cols, data })
    }

    /// Build a matrix by evaluating `f(row, col)` for every element.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut m = Self::zeros(rows, cols)?;
        for i in 0..rows {
            for j in 0..cols {
                m.data[i * cols + j] = f(i, j);
            }
        }
        Ok(m)
    }

    /// Build a matrix from row slices. Ragged input is a shape error.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(MatmulError::ShapeError {
                    rows: rows.len(),
                    cols,
                    len: data.len() + row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), cols, data)
    }

    /// `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        Self::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked element read.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.offset(row, col).map(|idx| self.data[idx])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let idx = self.offset(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// The whole row-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the row-major buffer, for kernels writing output.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Returns `self^T` as a new matrix.
    pub fn transpose(&self) -> Result<Matrix> {
        let mut out = Matrix::zeros(self.cols, self.rows)?;
        transpose::transpose(&self.data, &mut out.data, self.rows, self.cols);
        Ok(out)
    }

    /// Tolerance-bounded equality.
    ///
    /// Two elements match when `|x - y| <= tolerance * max(1, |x|, |y|)`,
    /// so the bound is absolute near zero and relative for large values.
    /// Matrices of different shape never compare equal, and NaN never
    /// matches anything.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        self.data.iter().zip(&other.data).all(|(&x, &y)| {
            let scale = 1.0f64.max(x.abs()).max(y.abs());
            (x - y).abs() <= tolerance * scale
        })
    }

    /// Largest element-wise absolute difference, or `None` if the shapes
    /// differ.
    pub fn max_abs_diff(&self, other: &Matrix) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
        )
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(MatmulError::IndexError {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for (j, v) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn element_count(rows: usize, cols: usize, len: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(MatmulError::ShapeError { rows, cols, len })
}
