use crate::error::{MatmulError, Result};

/// Transpose a matrix: dst = src^T
///
/// Converts from row-major (rows × cols) to row-major (cols × rows).
/// After transpose, what was column j of src becomes row j of dst, which
/// is what lets the vectorized kernel read B's columns contiguously.
///
/// # Arguments
///
/// * `src` - Source matrix (rows × cols), row-major
/// * `dst` - Destination matrix (cols × rows), row-major
/// * `rows` - Number of rows in src
/// * `cols` - Number of columns in src
///
/// # Example
///
/// ```
/// use matmul_kernels::matrix::transpose::transpose;
///
/// let src = vec![1.0, 2.0, 3.0,   // 2×3 matrix
///                4.0, 5.0, 6.0];
/// let mut dst = vec![0.0; 6];      // will be 3×2
///
/// transpose(&src, &mut dst, 2, 3);
///
/// assert_eq!(dst, vec![1.0, 4.0,   // 3×2 matrix
///                      2.0, 5.0,
///                      3.0, 6.0]);
/// ```
pub fn transpose(src: &[f64], dst: &mut [f64], rows: usize, cols: usize) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);

    for (i, src_row) in src.chunks_exact(cols.max(1)).take(rows).enumerate() {
        for (j, &v) in src_row.iter().enumerate() {
            dst[j * rows + i] = v;
        }
    }
}

/// Allocating transpose that reports allocation failure instead of
/// aborting. Returns `src^T` as a (cols × rows) row-major buffer.
pub fn try_transposed(src: &[f64], rows: usize, cols: usize) -> Result<Vec<f64>> {
    let elements = rows * cols;
    let mut dst = Vec::new();
    dst.try_reserve_exact(elements)
        .map_err(|_| MatmulError::AllocationFailure { elements })?;
    dst.resize(elements, 0.0);
    transpose(src, &mut dst, rows, cols);
    Ok(dst)
}
