use std::ops::Range;

/// i-k-j accumulation restricted to a sub-block: `C[rows, cols] += A[rows, inner] * B[inner, cols]`.
///
/// Swapping the j and k loops makes the innermost loop walk both B and C
/// sequentially (stride 1). The blocked kernel runs this on every tile,
/// and the edge tiles are just shorter ranges.
///
/// `a` is m × k, `b` is k × n and `c` is m × n, all row-major; the ranges
/// index into those full shapes.
#[allow(clippy::too_many_arguments)]
pub fn matmul_ikj_block(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    k: usize,
    rows: Range<usize>,
    inner: Range<usize>,
    cols: Range<usize>,
) {
    for i in rows {
        let c_row = &mut c[i * n + cols.start..i * n + cols.end];
        for t in inner.clone() {
            let a_it = a[i * k + t];
            let b_row = &b[t * n + cols.start..t * n + cols.end];
            for (cv, bv) in c_row.iter_mut().zip(b_row) {
                *cv += a_it * bv;
            }
        }
    }
}

/// Full i-k-j multiplication: `C = A * B`.
///
/// Same arithmetic as the blocked kernel with a single tile covering the
/// whole problem.
pub fn matmul_naive_ikj(a: &[f64], b: &[f64], c: &mut [f64], m: usize, n: usize, k: usize) {
    c.fill(0.0);
    matmul_ikj_block(a, b, c, n, k, 0..m, 0..k, 0..n);
}
