//! Multi-threaded GEMM.
//!
//! Output rows are split into contiguous ranges, one per worker. Each
//! worker runs the blocked or vectorized kernel on its own rows of C
//! against the whole of B, so workers never write the same memory and the
//! write path needs no locks.
//!
//! Available implementations:
//! - `gemm_rows_mt`: scoped threads over disjoint row chunks

pub mod gemm_rows_mt;

use std::ops::Range;

/// Split `rows` into at most `workers` contiguous, non-empty ranges.
///
/// Range sizes differ by at most one row, and there are never more ranges
/// than rows, so a 3-row problem on 8 workers gets exactly 3 ranges.
///
/// ```
/// use matmul_kernels::threaded::partition_rows;
///
/// assert_eq!(partition_rows(10, 3), vec![0..4, 4..7, 7..10]);
/// assert_eq!(partition_rows(2, 8), vec![0..1, 1..2]);
/// ```
pub fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.min(rows);
    if workers == 0 {
        return Vec::new();
    }

    let base = rows / workers;
    let extra = rows % workers;

    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_rows_once() {
        for rows in 0..50 {
            for workers in 1..12 {
                let ranges = partition_rows(rows, workers);
                assert_eq!(ranges.len(), workers.min(rows));

                let mut next = 0;
                for r in &ranges {
                    assert_eq!(r.start, next, "rows {} workers {}", rows, workers);
                    assert!(!r.is_empty());
                    next = r.end;
                }
                assert_eq!(next, rows);

                let min = ranges.iter().map(|r| r.len()).min().unwrap_or(0);
                let max = ranges.iter().map(|r| r.len()).max().unwrap_or(0);
                assert!(max - min <= 1, "unbalanced: {:?}", ranges);
            }
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        assert_eq!(partition_rows(3, 16), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_zero_workers() {
        assert!(partition_rows(10, 0).is_empty());
    }
}
