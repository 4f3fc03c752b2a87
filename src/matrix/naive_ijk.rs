/// Reference matrix multiplication using i-j-k loop order.
///
/// The textbook triple loop: each `C[i][j]` is a single running sum over
/// `t = 0..k`, left to right. This fixed order makes it the oracle every
/// other kernel is compared against. It's slow because the innermost loop
/// walks B with stride `n`.
///
/// `c` is overwritten, not accumulated into, so its previous contents are
/// never read.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, overwritten with A * B
/// * `m` - Rows of A and C
/// * `n` - Columns of B and C
/// * `k` - Columns of A, rows of B
pub fn matmul_naive_ijk(a: &[f64], b: &[f64], c: &mut [f64], m: usize, n: usize, k: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for t in 0..k {
                sum += a[i * k + t] * b[t * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}
