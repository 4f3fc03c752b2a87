//! Tiled GEMM driving the lane-parallel dot-product kernels.

use crate::error::Result;
use crate::kernels::DotKernel;
use crate::matrix::transpose::try_transposed;

/// Vectorized matrix multiplication: `C = A * B`.
///
/// Transposes B once so every `C[i][j]` is a dot product of two contiguous
/// slices, then walks `block`-sized tiles of (i, j, t) and hands each
/// depth segment to a `lanes`-wide dot kernel. Dimensions that aren't
/// multiples of `lanes` are covered by the kernel's scalar tail, and edge
/// tiles are clipped like in the blocked kernel.
///
/// # Errors
///
/// [`MatmulError::AllocationFailure`](crate::error::MatmulError::AllocationFailure)
/// if the transposed copy of B can't be allocated.
///
/// # Panics
///
/// Panics if `block == 0` or `lanes == 0`.
#[allow(clippy::too_many_arguments)]
pub fn matmul_vectorized(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    m: usize,
    n: usize,
    k: usize,
    block: usize,
    lanes: usize,
) -> Result<()> {
    let bt = try_transposed(b, k, n)?;
    matmul_vectorized_bt(a, &bt, c, m, n, k, block, DotKernel::select(lanes));
    Ok(())
}

/// Same as [`matmul_vectorized`] with B already transposed (`bt` is n × k).
///
/// The threaded kernel transposes B once and shares `bt` between workers.
#[allow(clippy::too_many_arguments)]
pub fn matmul_vectorized_bt(
    a: &[f64],
    bt: &[f64],
    c: &mut [f64],
    m: usize,
    n: usize,
    k: usize,
    block: usize,
    dot: DotKernel,
) {
    assert!(block > 0, "block size must be non-zero");
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(bt.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    c.fill(0.0);

    for ii in (0..m).step_by(block) {
        let i_end = (ii + block).min(m);
        for jj in (0..n).step_by(block) {
            let j_end = (jj + block).min(n);
            for tt in (0..k).step_by(block) {
                let t_end = (tt + block).min(k);
                for i in ii..i_end {
                    let a_seg = &a[i * k + tt..i * k + t_end];
                    for j in jj..j_end {
                        let b_seg = &bt[j * k + tt..j * k + t_end];
                        c[i * n + j] += dot.dot(a_seg, b_seg);
                    }
                }
            }
        }
    }
}
