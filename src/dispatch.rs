//! Strategy selection: one [`Kernel`] trait, one implementation per
//! [`Strategy`], and the `multiply` entry points that validate operands
//! before handing them to a kernel.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::blocked::gemm_tiled::matmul_blocked;
use crate::blocked::gemm_vectorized::matmul_vectorized_bt;
use crate::config::MultiplyOptions;
use crate::error::{MatmulError, Result};
use crate::kernels::DotKernel;
use crate::matrix::Matrix;
use crate::matrix::naive_ijk::matmul_naive_ijk;
use crate::matrix::transpose::try_transposed;
use crate::threaded::gemm_rows_mt::matmul_rows_mt;

/// Execution strategy for a multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Reference i-j-k triple loop.
    Naive,
    /// Cubic cache tiling.
    Blocked,
    /// Tiled, lane-parallel dot products.
    Vectorized,
    /// Row partitions across worker threads.
    Threaded,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Naive,
        Strategy::Blocked,
        Strategy::Vectorized,
        Strategy::Threaded,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Blocked => "blocked",
            Strategy::Vectorized => "vectorized",
            Strategy::Threaded => "threaded",
        }
    }

    /// Builds the kernel for this strategy with the tuning in `opts`.
    pub fn kernel(&self, opts: &MultiplyOptions) -> Box<dyn Kernel> {
        match self {
            Strategy::Naive => Box::new(NaiveKernel),
            Strategy::Blocked => Box::new(BlockedKernel::new(opts.block_size)),
            Strategy::Vectorized => {
                Box::new(VectorizedKernel::new(opts.block_size, opts.lane_width))
            }
            Strategy::Threaded => Box::new(ThreadedKernel::new(*opts)),
        }
    }

    fn check_options(&self, opts: &MultiplyOptions) -> Result<()> {
        match self {
            Strategy::Naive => Ok(()),
            Strategy::Blocked => opts.check_block_size(),
            Strategy::Vectorized => {
                opts.check_block_size()?;
                opts.check_lane_width()
            }
            Strategy::Threaded => opts.check_threaded(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" | "reference" => Ok(Strategy::Naive),
            "blocked" | "tiled" => Ok(Strategy::Blocked),
            "vectorized" | "simd" => Ok(Strategy::Vectorized),
            "threaded" | "parallel" => Ok(Strategy::Threaded),
            _ => Err(MatmulError::InvalidStrategy(s.to_string())),
        }
    }
}

/// A matrix multiplication implementation.
///
/// Implementations overwrite `out` completely; its previous contents are
/// never read.
pub trait Kernel: Send + Sync {
    fn name(&self) -> &'static str;

    /// `out = a * b`. `out` must already be `a.rows() x b.cols()`.
    fn multiply_into(&self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()>;

    /// `a * b` into a freshly allocated matrix.
    fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        check_operands(a, b)?;
        let mut out = Matrix::zeros(a.rows(), b.cols())?;
        self.multiply_into(a, b, &mut out)?;
        Ok(out)
    }
}

/// Reference kernel. Its output is what every other strategy is checked
/// against.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveKernel;

impl Kernel for NaiveKernel {
    fn name(&self) -> &'static str {
        Strategy::Naive.name()
    }

    fn multiply_into(&self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
        let (m, n, k) = check_output(a, b, out)?;
        matmul_naive_ijk(a.as_slice(), b.as_slice(), out.as_mut_slice(), m, n, k);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlockedKernel {
    block_size: usize,
}

impl BlockedKernel {
    pub fn new(block_size: usize) -> Self {
        BlockedKernel { block_size }
    }
}

impl Kernel for BlockedKernel {
    fn name(&self) -> &'static str {
        Strategy::Blocked.name()
    }

    fn multiply_into(&self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
        let (m, n, k) = check_output(a, b, out)?;
        MultiplyOptions::default()
            .with_block_size(self.block_size)
            .check_block_size()?;
        matmul_blocked(
            a.as_slice(),
            b.as_slice(),
            out.as_mut_slice(),
            m,
            n,
            k,
            self.block_size,
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VectorizedKernel {
    block_size: usize,
    lane_width: usize,
}

impl VectorizedKernel {
    pub fn new(block_size: usize, lane_width: usize) -> Self {
        VectorizedKernel {
            block_size,
            lane_width,
        }
    }
}

impl Kernel for VectorizedKernel {
    fn name(&self) -> &'static str {
        Strategy::Vectorized.name()
    }

    fn multiply_into(&self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
        let (m, n, k) = check_output(a, b, out)?;
        let opts = MultiplyOptions::default()
            .with_block_size(self.block_size)
            .with_lane_width(self.lane_width);
        opts.check_block_size()?;
        opts.check_lane_width()?;

        let bt = try_transposed(b.as_slice(), k, n)?;
        let dot = DotKernel::select(self.lane_width);
        debug!("vectorized dot kernel: {}", dot.name());
        matmul_vectorized_bt(
            a.as_slice(),
            &bt,
            out.as_mut_slice(),
            m,
            n,
            k,
            self.block_size,
            dot,
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThreadedKernel {
    options: MultiplyOptions,
}

impl ThreadedKernel {
    pub fn new(options: MultiplyOptions) -> Self {
        ThreadedKernel { options }
    }
}

impl Kernel for ThreadedKernel {
    fn name(&self) -> &'static str {
        Strategy::Threaded.name()
    }

    fn multiply_into(&self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
        let (m, n, k) = check_output(a, b, out)?;
        matmul_rows_mt(
            a.as_slice(),
            b.as_slice(),
            out.as_mut_slice(),
            m,
            n,
            k,
            &self.options,
        )?;
        Ok(())
    }
}

/// `C = A * B` with the given strategy, into a new matrix.
///
/// # Errors
///
/// - [`MatmulError::DimensionMismatch`] if `a.cols() != b.rows()` or any
///   dimension is zero
/// - [`MatmulError::InvalidConfig`] if `opts` is unusable for `strategy`
/// - [`MatmulError::AllocationFailure`] if the output can't be allocated
/// - [`MatmulError::WorkerFailed`] if a threaded worker fails
///
/// ```
/// use matmul_kernels::{multiply, Matrix, MultiplyOptions, Strategy};
///
/// let a = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
/// let b = Matrix::from_rows(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]).unwrap();
///
/// let c = multiply(&a, &b, Strategy::Blocked, &MultiplyOptions::default()).unwrap();
/// assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
/// ```
pub fn multiply(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
) -> Result<Matrix> {
    check_operands(a, b)?;
    strategy.check_options(opts)?;
    let mut out = Matrix::zeros(a.rows(), b.cols())?;
    dispatch(a, b, strategy, opts, &mut out)?;
    Ok(out)
}

/// `out = A * B` with the given strategy, reusing a pre-allocated output.
///
/// `out` must be exactly `a.rows() x b.cols()`; its previous contents are
/// ignored. On error, `out` holds no partial product: either nothing was
/// written, or it was zeroed.
///
/// # Errors
///
/// Same as [`multiply`], plus [`MatmulError::ShapeError`] when `out` has the
/// wrong shape.
pub fn multiply_into(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
    out: &mut Matrix,
) -> Result<()> {
    check_output(a, b, out)?;
    strategy.check_options(opts)?;
    dispatch(a, b, strategy, opts, out)
}

/// Like [`multiply`], with the strategy given by name (`"naive"`,
/// `"blocked"`, `"vectorized"`, `"threaded"`, case-insensitive).
///
/// # Errors
///
/// [`MatmulError::InvalidStrategy`] for an unknown name, otherwise as
/// [`multiply`].
pub fn multiply_by_name(
    a: &Matrix,
    b: &Matrix,
    strategy: &str,
    opts: &MultiplyOptions,
) -> Result<Matrix> {
    multiply(a, b, strategy.parse()?, opts)
}

fn dispatch(
    a: &Matrix,
    b: &Matrix,
    strategy: Strategy,
    opts: &MultiplyOptions,
    out: &mut Matrix,
) -> Result<()> {
    debug!(
        "multiply [{}x{}] @ [{}x{}] with {}",
        a.rows(),
        a.cols(),
        b.rows(),
        b.cols(),
        strategy
    );
    strategy.kernel(opts).multiply_into(a, b, out)
}

/// Operands must be `[m x k] @ [k x n]` with every dimension non-zero.
/// Returns `(m, n, k)`.
pub fn check_operands(a: &Matrix, b: &Matrix) -> Result<(usize, usize, usize)> {
    let (m, k) = a.shape();
    let (k2, n) = b.shape();
    if k != k2 || m == 0 || k == 0 || n == 0 {
        return Err(MatmulError::DimensionMismatch { m, k, k2, n });
    }
    Ok((m, n, k))
}

fn check_output(a: &Matrix, b: &Matrix, out: &Matrix) -> Result<(usize, usize, usize)> {
    let (m, n, k) = check_operands(a, b)?;
    if out.shape() != (m, n) {
        return Err(MatmulError::ShapeError {
            rows: m,
            cols: n,
            len: out.len(),
        });
    }
    Ok((m, n, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pair() -> (Matrix, Matrix) {
        let a = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]).unwrap();
        (a, b)
    }

    #[test]
    fn test_strategy_parse_and_display() {
        for s in Strategy::ALL {
            assert_eq!(s.to_string().parse::<Strategy>().unwrap(), s);
        }
        assert_eq!(" SIMD ".parse::<Strategy>().unwrap(), Strategy::Vectorized);
        assert_eq!("reference".parse::<Strategy>().unwrap(), Strategy::Naive);
        assert_eq!(
            "strassen".parse::<Strategy>().unwrap_err(),
            MatmulError::InvalidStrategy("strassen".into())
        );
    }

    #[test]
    fn test_kernel_names_match_strategy() {
        let opts = MultiplyOptions::default();
        for s in Strategy::ALL {
            assert_eq!(s.kernel(&opts).name(), s.name());
        }
    }

    #[test]
    fn test_every_strategy_known_values() {
        let (a, b) = small_pair();
        let opts = MultiplyOptions::default().with_workers(2);
        for s in Strategy::ALL {
            let c = multiply(&a, &b, s, &opts).unwrap();
            assert_eq!(c.shape(), (2, 2));
            assert!(
                c.approx_eq(&Matrix::from_rows(&[&[58.0, 64.0], &[139.0, 154.0]]).unwrap(), 1e-12),
                "{}: {}",
                s,
                c
            );
        }
    }

    #[test]
    fn test_mismatch_rejected_before_dispatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        let b = Matrix::zeros(2, 3).unwrap();
        for s in Strategy::ALL {
            let err = multiply(&a, &b, s, &MultiplyOptions::default()).unwrap_err();
            assert_eq!(
                err,
                MatmulError::DimensionMismatch {
                    m: 2,
                    k: 3,
                    k2: 2,
                    n: 3
                }
            );
        }
    }

    #[test]
    fn test_zero_sized_operand_rejected() {
        let a = Matrix::zeros(0, 3).unwrap();
        let b = Matrix::zeros(3, 2).unwrap();
        let err = multiply(&a, &b, Strategy::Naive, &MultiplyOptions::default()).unwrap_err();
        assert!(matches!(err, MatmulError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_multiply_into_overwrites_previous_contents() {
        let (a, b) = small_pair();
        for s in Strategy::ALL {
            let mut out = Matrix::new(2, 2, Some(vec![f64::NAN, 1e9, -3.0, 7.0])).unwrap();
            multiply_into(&a, &b, s, &MultiplyOptions::default(), &mut out).unwrap();
            assert_eq!(out.as_slice(), &[58.0, 64.0, 139.0, 154.0], "{}", s);
        }
    }

    #[test]
    fn test_multiply_into_wrong_output_shape() {
        let (a, b) = small_pair();
        let mut out = Matrix::zeros(2, 3).unwrap();
        let err =
            multiply_into(&a, &b, Strategy::Blocked, &MultiplyOptions::default(), &mut out)
                .unwrap_err();
        assert!(matches!(err, MatmulError::ShapeError { rows: 2, cols: 2, .. }));
    }

    #[test]
    fn test_invalid_options_per_strategy() {
        let (a, b) = small_pair();
        let zero_block = MultiplyOptions::default().with_block_size(0);
        assert!(multiply(&a, &b, Strategy::Naive, &zero_block).is_ok());
        assert!(matches!(
            multiply(&a, &b, Strategy::Blocked, &zero_block),
            Err(MatmulError::InvalidConfig(_))
        ));

        let zero_lanes = MultiplyOptions::default().with_lane_width(0);
        assert!(multiply(&a, &b, Strategy::Blocked, &zero_lanes).is_ok());
        assert!(matches!(
            multiply(&a, &b, Strategy::Vectorized, &zero_lanes),
            Err(MatmulError::InvalidConfig(_))
        ));

        let zero_workers = MultiplyOptions::default().with_workers(0);
        assert!(matches!(
            multiply(&a, &b, Strategy::Threaded, &zero_workers),
            Err(MatmulError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_kernel_used_directly_validates_config() {
        let (a, b) = small_pair();
        let mut out = Matrix::zeros(2, 2).unwrap();
        assert!(matches!(
            BlockedKernel::new(0).multiply_into(&a, &b, &mut out),
            Err(MatmulError::InvalidConfig(_))
        ));
        assert!(matches!(
            VectorizedKernel::new(8, 0).multiply(&a, &b),
            Err(MatmulError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_multiply_by_name() {
        let (a, b) = small_pair();
        let opts = MultiplyOptions::default();
        let c = multiply_by_name(&a, &b, "Threaded", &opts).unwrap();
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
        assert_eq!(
            multiply_by_name(&a, &b, "gpu", &opts).unwrap_err(),
            MatmulError::InvalidStrategy("gpu".into())
        );
    }
}
