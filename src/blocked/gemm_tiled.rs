//! Cubic cache tiling over (i, t, j).

use crate::matrix::naive_ikj::matmul_ikj_block;

/// Cache-blocked matrix multiplication: `C = A * B`.
///
/// Splits the iteration space into `block × block × block` tiles so the
/// slices of A, B and C touched by one tile stay in L1/L2 while they're
/// reused. Tiles on the right and bottom edges are clipped to whatever is
/// left, so dimensions don't need to be multiples of `block`.
///
/// Partial products are summed tile by tile, not in one left-to-right
/// pass over `t`, so results can differ from the reference kernel in the
/// last few bits.
///
/// # Panics
///
/// Panics if `block == 0`. The dispatcher rejects that before calling in.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, overwritten
/// * `block` - Tile edge length
pub fn matmul_blocked(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    m: usize,
    n: usize,
    k: usize,
    block: usize,
) {
    assert!(block > 0, "block size must be non-zero");
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    c.fill(0.0);

    // Outer: rows of C. Middle: depth. Inner: columns of C.
    // Keeping the row block outermost means a worker that owns a row range
    // only ever touches its own rows of C.
    for ii in (0..m).step_by(block) {
        let i_end = (ii + block).min(m);
        for tt in (0..k).step_by(block) {
            let t_end = (tt + block).min(k);
            for jj in (0..n).step_by(block) {
                let j_end = (jj + block).min(n);
                matmul_ikj_block(a, b, c, n, k, ii..i_end, tt..t_end, jj..j_end);
            }
        }
    }
}
