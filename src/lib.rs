//! Dense matrix multiplication with interchangeable strategies.
//!
//! Four kernels share one contract, `C = A * B` on row-major `f64`
//! matrices: a naive reference loop, a cache-blocked loop nest, a
//! vectorized kernel with lane-parallel accumulators (AVX2 + FMA where the
//! CPU has it), and a threaded kernel that splits output rows across
//! workers. Pick one with [`Strategy`]; [`multiply`] checks the operands
//! once and dispatches.
//!
//! ## Usage
//!
//! ```
//! use matmul_kernels::{multiply, Matrix, MultiplyOptions, Strategy};
//!
//! let a = Matrix::new(256, 256, Some(vec![1.0; 256 * 256])).unwrap();
//! let b = Matrix::identity(256).unwrap();
//!
//! let c = multiply(&a, &b, Strategy::Vectorized, &MultiplyOptions::default()).unwrap();
//! assert!(c.approx_eq(&a, 1e-12));
//! ```
//!
//! For large matrices, use the threaded strategy and pick the worker count:
//!
//! ```
//! use matmul_kernels::{multiply, Matrix, MultiplyOptions, Strategy};
//!
//! let a = Matrix::new(512, 512, Some(vec![1.0; 512 * 512])).unwrap();
//! let b = Matrix::new(512, 512, Some(vec![1.0; 512 * 512])).unwrap();
//!
//! let opts = MultiplyOptions::default().with_workers(4);
//! let c = multiply(&a, &b, Strategy::Threaded, &opts).unwrap();
//! assert_eq!(c.get(0, 0).unwrap(), 512.0);
//! ```
//!
//! ## What's inside
//!
//! - `matrix`: the container, the i-j-k reference loop, transpose
//! - `blocked`: cubic cache tiling and the tiled vectorized driver
//! - `kernels`: lane-parallel dot products (portable and AVX2)
//! - `threaded`: row partitioning over scoped threads
//! - `harness`: tolerance model, validation and benchmark sampling

pub mod blocked;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod matrix;
pub mod threaded;

pub use config::{InnerKernel, MultiplyOptions};
pub use dispatch::{
    BlockedKernel, Kernel, NaiveKernel, Strategy, ThreadedKernel, VectorizedKernel, multiply,
    multiply_by_name, multiply_into,
};
pub use error::{MatmulError, Result};
pub use matrix::Matrix;
pub use matrix::naive_ijk::matmul_naive_ijk;
pub use matrix::naive_ikj::matmul_naive_ikj;
