//! Portable lane-parallel dot products.
//!
//! Each lane keeps its own running sum, which breaks the loop-carried
//! dependency on a single accumulator and lets the compiler map the lanes
//! onto vector registers. Leftover elements (`len % L`) go through a scalar
//! tail loop before the lanes are reduced.

/// Dot product with `L` independent accumulators.
pub fn dot_lanes<const L: usize>(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());

    let mut acc = [0.0f64; L];
    let x_chunks = x.chunks_exact(L);
    let y_chunks = y.chunks_exact(L);
    let x_tail = x_chunks.remainder();
    let y_tail = y_chunks.remainder();

    for (xs, ys) in x_chunks.zip(y_chunks) {
        for ((lane, xv), yv) in acc.iter_mut().zip(xs).zip(ys) {
            *lane += xv * yv;
        }
    }

    let mut sum: f64 = acc.iter().sum();
    for (xv, yv) in x_tail.iter().zip(y_tail) {
        sum += xv * yv;
    }
    sum
}

/// Same as [`dot_lanes`] for a lane width only known at runtime.
///
/// # Panics
///
/// Panics if `lanes == 0`.
pub fn dot_lanes_dyn(x: &[f64], y: &[f64], lanes: usize) -> f64 {
    assert!(lanes > 0, "lane width must be non-zero");
    debug_assert_eq!(x.len(), y.len());

    let mut acc = vec![0.0f64; lanes];
    let x_chunks = x.chunks_exact(lanes);
    let y_chunks = y.chunks_exact(lanes);
    let x_tail = x_chunks.remainder();
    let y_tail = y_chunks.remainder();

    for (xs, ys) in x_chunks.zip(y_chunks) {
        for ((lane, xv), yv) in acc.iter_mut().zip(xs).zip(ys) {
            *lane += xv * yv;
        }
    }

    let mut sum: f64 = acc.iter().sum();
    for (xv, yv) in x_tail.iter().zip(y_tail) {
        sum += xv * yv;
    }
    sum
}
