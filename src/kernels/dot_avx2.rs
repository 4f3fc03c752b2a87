//! AVX2 + FMA dot-product microkernels.

use std::arch::x86_64::*;

/// Dot product with one 4-wide accumulator register.
///
/// # Safety
///
/// Caller must ensure the CPU supports AVX2 and FMA, and that
/// `x.len() == y.len()`.
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn dot_avx2_x4(x: &[f64], y: &[f64]) -> f64 {
    let len = x.len().min(y.len());
    let main = (len / 4) * 4;
    let xp = x.as_ptr();
    let yp = y.as_ptr();

    let mut acc = _mm256_setzero_pd();
    let mut p = 0;
    while p < main {
        let xv = _mm256_loadu_pd(xp.add(p));
        let yv = _mm256_loadu_pd(yp.add(p));
        acc = _mm256_fmadd_pd(xv, yv, acc);
        p += 4;
    }

    let mut lanes = [0.0f64; 4];
    _mm256_storeu_pd(lanes.as_mut_ptr(), acc);
    let mut sum: f64 = lanes.iter().sum();

    for t in main..len {
        sum += x[t] * y[t];
    }
    sum
}

/// Dot product with two 4-wide accumulators (8 lanes).
///
/// Two independent FMA chains hide the FMA latency better than one.
///
/// # Safety
///
/// Caller must ensure the CPU supports AVX2 and FMA, and that
/// `x.len() == y.len()`.
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn dot_avx2_x8(x: &[f64], y: &[f64]) -> f64 {
    let len = x.len().min(y.len());
    let main = (len / 8) * 8;
    let xp = x.as_ptr();
    let yp = y.as_ptr();

    let mut acc0 = _mm256_setzero_pd();
    let mut acc1 = _mm256_setzero_pd();
    let mut p = 0;
    while p < main {
        let x0 = _mm256_loadu_pd(xp.add(p));
        let y0 = _mm256_loadu_pd(yp.add(p));
        let x1 = _mm256_loadu_pd(xp.add(p + 4));
        let y1 = _mm256_loadu_pd(yp.add(p + 4));
        acc0 = _mm256_fmadd_pd(x0, y0, acc0);
        acc1 = _mm256_fmadd_pd(x1, y1, acc1);
        p += 8;
    }

    let mut lanes = [0.0f64; 4];
    _mm256_storeu_pd(lanes.as_mut_ptr(), _mm256_add_pd(acc0, acc1));
    let mut sum: f64 = lanes.iter().sum();

    for t in main..len {
        sum += x[t] * y[t];
    }
    sum
}
