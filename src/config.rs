//! Per-call tuning options.
//!
//! Nothing here is global: every `multiply` call takes its own
//! [`MultiplyOptions`], and the defaults are plain constants.

use crate::blocked::DEFAULT_BLOCK_SIZE;
use crate::error::{MatmulError, Result};
use crate::kernels::DEFAULT_LANE_WIDTH;

/// Kernel each worker of the threaded strategy runs on its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InnerKernel {
    #[default]
    Blocked,
    Vectorized,
}

/// Tuning knobs for the blocked, vectorized and threaded strategies.
///
/// ```
/// use matmul_kernels::{InnerKernel, MultiplyOptions};
///
/// let opts = MultiplyOptions::default()
///     .with_block_size(32)
///     .with_lane_width(4)
///     .with_workers(2)
///     .with_inner(InnerKernel::Vectorized);
/// assert_eq!(opts.worker_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplyOptions {
    /// Tile edge for the blocked and vectorized kernels.
    pub block_size: usize,
    /// Accumulator lanes for the vectorized kernel.
    pub lane_width: usize,
    /// Worker threads for the threaded kernel; `None` uses every hardware
    /// thread.
    pub workers: Option<usize>,
    pub threaded_inner: InnerKernel,
}

impl Default for MultiplyOptions {
    fn default() -> Self {
        MultiplyOptions {
            block_size: DEFAULT_BLOCK_SIZE,
            lane_width: DEFAULT_LANE_WIDTH,
            workers: None,
            threaded_inner: InnerKernel::Blocked,
        }
    }
}

impl MultiplyOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_lane_width(mut self, lane_width: usize) -> Self {
        self.lane_width = lane_width;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_inner(mut self, inner: InnerKernel) -> Self {
        self.threaded_inner = inner;
        self
    }

    /// Requested worker count, falling back to the available hardware
    /// parallelism (or 1 if that can't be queried).
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|t| t.get())
                .unwrap_or(1)
        })
    }

    pub(crate) fn check_block_size(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(MatmulError::InvalidConfig(
                "block size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_lane_width(&self) -> Result<()> {
        if self.lane_width == 0 {
            return Err(MatmulError::InvalidConfig(
                "lane width must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_workers(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(MatmulError::InvalidConfig(
                "worker count must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Checks the options the threaded strategy reads: the worker count
    /// plus whatever its inner kernel needs.
    pub(crate) fn check_threaded(&self) -> Result<()> {
        self.check_workers()?;
        self.check_block_size()?;
        if self.threaded_inner == InnerKernel::Vectorized {
            self.check_lane_width()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = MultiplyOptions::default();
        assert_eq!(opts.block_size, 64);
        assert_eq!(opts.lane_width, 8);
        assert_eq!(opts.threaded_inner, InnerKernel::Blocked);
        assert!(opts.worker_count() >= 1);
    }

    #[test]
    fn test_zero_values_rejected() {
        let opts = MultiplyOptions::default()
            .with_block_size(0)
            .with_lane_width(0)
            .with_workers(0);
        assert!(matches!(
            opts.check_block_size(),
            Err(MatmulError::InvalidConfig(_))
        ));
        assert!(matches!(
            opts.check_lane_width(),
            Err(MatmulError::InvalidConfig(_))
        ));
        assert!(matches!(
            opts.check_workers(),
            Err(MatmulError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_threaded_ignores_lane_width_for_blocked_inner() {
        let opts = MultiplyOptions::default().with_lane_width(0);
        assert!(opts.check_threaded().is_ok());
        assert!(opts.with_inner(InnerKernel::Vectorized).check_threaded().is_err());
    }
}
