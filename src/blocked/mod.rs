//! Cache-blocked GEMM drivers.
//!
//! Both drivers tile the loop nest into blocks that fit in L1/L2 cache and
//! clip the edge tiles to the remainder:
//! - `gemm_tiled`: cubic (i, t, j) tiles, stride-1 i-k-j loop inside
//! - `gemm_vectorized`: (i, j, t) tiles over a transposed B, calling the
//!   lane-parallel dot kernels from [`crate::kernels`]

pub mod gemm_tiled;
pub mod gemm_vectorized;

/// Default tile edge. 64 × 64 f64 tiles of A, B and C come to 96 KiB, which
/// sits comfortably in a typical L2.
pub const DEFAULT_BLOCK_SIZE: usize = 64;
