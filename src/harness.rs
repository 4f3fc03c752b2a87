//! What test and benchmark drivers build on: a tolerance model for
//! comparing strategies against the reference kernel, a validation report,
//! timed benchmark samples, and seeded random operands.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::config::MultiplyOptions;
use crate::dispatch::{Strategy, check_operands, multiply, multiply_into};
use crate::error::{MatmulError, Result};
use crate::matrix::Matrix;

/// Absolute-plus-relative error bound for comparing a result against the
/// reference kernel.
///
/// A value passes when `|expected - actual| <= abs + rel * max(|expected|, |actual|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerance {
    /// Tolerance for sums of `k` products of operands no larger than 1 in
    /// magnitude.
    pub fn for_inner_dim(k: usize) -> Self {
        Self::scaled(k, 1.0)
    }

    /// Tolerance for `a * b`, with the absolute bound scaled by
    /// `max|A| * max|B|`.
    ///
    /// Outputs that cancel to near zero are still sums of large terms, so
    /// their rounding error follows the operand magnitude, not the result.
    pub fn for_operands(a: &Matrix, b: &Matrix) -> Self {
        Self::scaled(a.cols(), max_abs(a) * max_abs(b))
    }

    /// Reordering a sum of `k` terms of magnitude up to `term` moves the
    /// result by up to about `k * eps * term`, so both bounds grow linearly
    /// with `k`.
    pub fn scaled(k: usize, term: f64) -> Self {
        let k = k.max(1) as f64;
        let rel = 4.0 * f64::EPSILON * k;
        Tolerance {
            abs: rel * term,
            rel,
        }
    }

    pub fn accepts(&self, expected: f64, actual: f64) -> bool {
        let scale = expected.abs().max(actual.abs());
        (expected - actual).abs() <= self.abs + self.rel * scale
    }

    /// Same shape and every element accepted.
    pub fn matrices_match(&self, expected: &Matrix, actual: &Matrix) -> bool {
        expected.shape() == actual.shape()
            && expected
                .as_slice()
                .iter()
                .zip(actual.as_slice())
                .all(|(&e, &a)| self.accepts(e, a))
    }
}

/// Outcome of checking one strategy against the reference kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub strategy: Strategy,
    /// `(m, n, k)`
    pub dims: (usize, usize, usize),
    pub max_abs_diff: f64,
    pub tolerance: Tolerance,
    pub passed: bool,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, n, k) = self.dims;
        write!(
            f,
            "{:<10} {}x{}x{}  max |diff| = {:.3e}  {}",
            self.strategy.name(),
            m,
            n,
            k,
            self.max_abs_diff,
            if self.passed { "ok" } else { "FAILED" }
        )
    }
}

/// Runs `strategy` and the reference kernel on the same operands and
/// compares the results with [`Tolerance::for_operands`].
///
/// # Errors
///
/// Whatever either multiplication returns; a tolerance failure is reported
/// through [`ValidationReport::passed`], not as an error.
pub fn validate(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
) -> Result<ValidationReport> {
    validate_with(a, b, strategy, opts, Tolerance::for_operands(a, b))
}

/// [`validate`] with a caller-chosen tolerance.
pub fn validate_with(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
    tolerance: Tolerance,
) -> Result<ValidationReport> {
    let (m, n, k) = check_operands(a, b)?;
    let expected = multiply(a, b, Strategy::Naive, opts)?;
    let actual = multiply(a, b, strategy, opts)?;

    let passed = tolerance.matrices_match(&expected, &actual);
    let max_abs_diff = expected.max_abs_diff(&actual).unwrap_or(f64::INFINITY);

    if !passed {
        warn!(
            "{} diverges from reference on {}x{}x{}: max |diff| = {:e}",
            strategy, m, n, k, max_abs_diff
        );
    }

    Ok(ValidationReport {
        strategy,
        dims: (m, n, k),
        max_abs_diff,
        tolerance,
        passed,
    })
}

/// Wall-clock timings of repeated calls to one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchSample {
    pub strategy: Strategy,
    /// `(m, n, k)`
    pub dims: (usize, usize, usize),
    pub timings: Vec<Duration>,
}

impl BenchSample {
    /// Floating point operations per call: one multiply and one add per
    /// `(i, j, t)` triple.
    pub fn flops_per_call(&self) -> f64 {
        let (m, n, k) = self.dims;
        2.0 * (m as f64) * (n as f64) * (k as f64)
    }

    pub fn mean(&self) -> Duration {
        if self.timings.is_empty() {
            return Duration::ZERO;
        }
        self.timings.iter().sum::<Duration>() / self.timings.len() as u32
    }

    pub fn min(&self) -> Duration {
        self.timings.iter().min().copied().unwrap_or(Duration::ZERO)
    }

    /// Throughput at the mean call time.
    pub fn gflops(&self) -> f64 {
        let secs = self.mean().as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.flops_per_call() / secs / 1e9
    }
}

/// Times `iterations` calls of `strategy`, after one untimed warm-up call.
///
/// Every call writes into the same pre-allocated output, so allocation is
/// not part of the measurement.
///
/// # Errors
///
/// [`MatmulError::InvalidConfig`] if `iterations == 0`, otherwise whatever
/// the multiplication returns.
pub fn bench(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
    iterations: usize,
) -> Result<BenchSample> {
    if iterations == 0 {
        return Err(MatmulError::InvalidConfig(
            "benchmark needs at least one iteration".into(),
        ));
    }
    let (m, n, k) = check_operands(a, b)?;
    let mut out = Matrix::zeros(m, n)?;

    // Warmup
    multiply_into(a, b, strategy, opts, &mut out)?;

    let mut timings = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        multiply_into(black_box(a), black_box(b), strategy, opts, &mut out)?;
        timings.push(start.elapsed());
        black_box(out.as_slice());
    }

    let sample = BenchSample {
        strategy,
        dims: (m, n, k),
        timings,
    };
    debug!(
        "bench {} {}x{}x{}: mean {:?}, {:.2} GFLOPS",
        strategy,
        m,
        n,
        k,
        sample.mean(),
        sample.gflops()
    );
    Ok(sample)
}

/// `rows x cols` matrix of values uniform in `[-1, 1)`, reproducible from
/// `seed`.
pub fn random_matrix(rows: usize, cols: usize, seed: u64) -> Result<Matrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    Matrix::from_fn(rows, cols, |_, _| dist.sample(&mut rng))
}

fn max_abs(m: &Matrix) -> f64 {
    m.as_slice().iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
