//! Row-partitioned multi-threaded GEMM.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use log::{debug, trace, warn};

use super::partition_rows;
use crate::blocked::gemm_tiled::matmul_blocked;
use crate::blocked::gemm_vectorized::matmul_vectorized_bt;
use crate::config::{InnerKernel, MultiplyOptions};
use crate::error::{MatmulError, Result};
use crate::kernels::DotKernel;
use crate::matrix::transpose::try_transposed;

/// Multi-threaded matrix multiplication: `C = A * B`.
///
/// Splits C's rows across `opts.worker_count()` workers (never more
/// workers than rows). Each worker gets its slice of A's rows and its own
/// disjoint `&mut` slice of C, and runs `opts.threaded_inner` on it. A and
/// B are only read, so they're shared by reference. When the inner kernel
/// is the vectorized one, B is transposed once here and the transpose is
/// shared instead.
///
/// Returns the number of workers that ran. A single partition runs on the
/// calling thread.
///
/// # Errors
///
/// [`MatmulError::InvalidConfig`] for zero workers, block size or (for the
/// vectorized inner kernel) lane width. [`MatmulError::WorkerFailed`] if a
/// worker panics; C is zeroed in that case so no partial result leaks.
pub fn matmul_rows_mt(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    m: usize,
    n: usize,
    k: usize,
    opts: &MultiplyOptions,
) -> Result<usize> {
    opts.check_threaded()?;
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    let workers = opts.worker_count();
    let block = opts.block_size;

    match opts.threaded_inner {
        InnerKernel::Blocked => run_partitioned(a, c, m, n, k, workers, |a_rows, c_rows, rows| {
            matmul_blocked(a_rows, b, c_rows, rows, n, k, block)
        }),
        InnerKernel::Vectorized => {
            let bt = try_transposed(b, k, n)?;
            let dot = DotKernel::select(opts.lane_width);
            debug!("threaded inner kernel: vectorized ({})", dot.name());
            run_partitioned(a, c, m, n, k, workers, |a_rows, c_rows, rows| {
                matmul_vectorized_bt(a_rows, &bt, c_rows, rows, n, k, block, dot)
            })
        }
    }
}

/// Fork-join over row ranges: `body(a_rows, c_rows, row_count)` runs once per
/// partition, on its own scoped thread, and every thread is joined before
/// returning.
pub(crate) fn run_partitioned<F>(
    a: &[f64],
    c: &mut [f64],
    m: usize,
    n: usize,
    k: usize,
    workers: usize,
    body: F,
) -> Result<usize>
where
    F: Fn(&[f64], &mut [f64], usize) + Sync,
{
    let ranges = partition_rows(m, workers);
    debug!(
        "threaded matmul [{}x{}] @ [{}x{}]: {} workers requested, {} spawned",
        m,
        k,
        k,
        n,
        workers,
        ranges.len()
    );

    if ranges.len() <= 1 {
        return match panic::catch_unwind(AssertUnwindSafe(|| body(a, &mut *c, m))) {
            Ok(()) => Ok(ranges.len()),
            Err(payload) => {
                c.fill(0.0);
                let err = MatmulError::WorkerFailed {
                    worker: 0,
                    reason: panic_reason(payload),
                };
                warn!("threaded matmul: {}", err);
                Err(err)
            }
        };
    }

    // Carve C into one disjoint row chunk per worker.
    let mut chunks = Vec::with_capacity(ranges.len());
    let mut rest = &mut *c;
    for range in &ranges {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * n);
        chunks.push((range.clone(), head));
        rest = tail;
    }

    let body = &body;
    let outcomes: Vec<thread::Result<()>> = thread::scope(|s| {
        let handles: Vec<_> = chunks
            .into_iter()
            .enumerate()
            .map(|(worker, (range, c_rows))| {
                let a_rows = &a[range.start * k..range.end * k];
                s.spawn(move || {
                    trace!("worker {} computing rows {:?}", worker, range);
                    body(a_rows, c_rows, range.len())
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut failures = outcomes
        .into_iter()
        .enumerate()
        .filter_map(|(worker, outcome)| {
            outcome.err().map(|payload| MatmulError::WorkerFailed {
                worker,
                reason: panic_reason(payload),
            })
        })
        .inspect(|err| warn!("threaded matmul: {}", err))
        .collect::<Vec<_>>();

    if failures.is_empty() {
        Ok(ranges.len())
    } else {
        c.fill(0.0);
        Err(failures.swap_remove(0))
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive_ijk::matmul_naive_ijk;

    fn operands(m: usize, n: usize, k: usize) -> (Vec<f64>, Vec<f64>) {
        let a: Vec<f64> = (0..m * k).map(|i| (i % 10) as f64).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 10) as f64).collect();
        (a, b)
    }

    fn assert_close(expected: &[f64], actual: &[f64], name: &str) {
        for i in 0..expected.len() {
            assert!(
                (expected[i] - actual[i]).abs() < 1e-8,
                "{}: mismatch at {}: expected={}, got={}",
                name,
                i,
                expected[i],
                actual[i]
            );
        }
    }

    #[test]
    fn test_rows_mt_correctness() {
        let (m, n, k) = (67, 45, 33);
        let (a, b) = operands(m, n, k);

        let mut c_naive = vec![0.0; m * n];
        matmul_naive_ijk(&a, &b, &mut c_naive, m, n, k);

        for inner in [InnerKernel::Blocked, InnerKernel::Vectorized] {
            let opts = MultiplyOptions::default()
                .with_workers(4)
                .with_block_size(16)
                .with_lane_width(4)
                .with_inner(inner);
            let mut c_mt = vec![f64::NAN; m * n];
            let used = matmul_rows_mt(&a, &b, &mut c_mt, m, n, k, &opts).unwrap();
            assert_eq!(used, 4);
            assert_close(&c_naive, &c_mt, &format!("{:?}", inner));
        }
    }

    #[test]
    fn test_workers_capped_by_rows() {
        let (m, n, k) = (3, 5, 4);
        let (a, b) = operands(m, n, k);

        let mut c_naive = vec![0.0; m * n];
        matmul_naive_ijk(&a, &b, &mut c_naive, m, n, k);

        let opts = MultiplyOptions::default().with_workers(16);
        let mut c_mt = vec![0.0; m * n];
        let used = matmul_rows_mt(&a, &b, &mut c_mt, m, n, k, &opts).unwrap();

        assert_eq!(used, 3);
        assert_close(&c_naive, &c_mt, "capped");
    }

    #[test]
    fn test_single_worker_runs_inline() {
        let (m, n, k) = (5, 5, 5);
        let (a, b) = operands(m, n, k);
        let opts = MultiplyOptions::default().with_workers(1);
        let mut c = vec![0.0; m * n];
        assert_eq!(matmul_rows_mt(&a, &b, &mut c, m, n, k, &opts).unwrap(), 1);
    }

    #[test]
    fn test_inline_panic_is_reported() {
        let mut c = vec![0.0; 4];
        let err = run_partitioned(&[1.0; 4], &mut c, 2, 2, 2, 1, |_, c_rows, _| {
            c_rows.fill(5.0);
            panic!("inline failure");
        })
        .unwrap_err();
        assert_eq!(
            err,
            MatmulError::WorkerFailed {
                worker: 0,
                reason: "inline failure".into()
            }
        );
        assert!(c.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let opts = MultiplyOptions::default().with_workers(0);
        let mut c = vec![0.0; 1];
        let err = matmul_rows_mt(&[1.0], &[1.0], &mut c, 1, 1, 1, &opts).unwrap_err();
        assert!(matches!(err, MatmulError::InvalidConfig(_)));
    }

    #[test]
    fn test_worker_panic_is_reported_and_output_cleared() {
        let (m, n, k) = (8, 2, 2);
        let (a, _) = operands(m, n, k);
        let mut c = vec![0.0; m * n];

        let result = run_partitioned(&a, &mut c, m, n, k, 4, |a_rows, c_rows, _| {
            if a_rows.as_ptr() == a[4 * k..].as_ptr() {
                panic!("injected failure");
            }
            c_rows.fill(1.0);
        });

        match result {
            Err(MatmulError::WorkerFailed { worker, reason }) => {
                assert_eq!(worker, 2);
                assert_eq!(reason, "injected failure");
            }
            other => panic!("expected WorkerFailed, got {:?}", other),
        }
        assert!(c.iter().all(|&v| v == 0.0), "partial output leaked");
    }
}
