//! Dot-product microkernels for the vectorized strategy.
//!
//! The vectorized GEMM turns every output element into a contiguous dot
//! product (B is transposed up front). These kernels compute that dot
//! product across `L` lanes at once, with a scalar tail for the leftovers.
//!
//! Available kernels:
//! - `dot_lanes`: portable, `L` independent accumulators (any width)
//! - `dot_avx2`: AVX2 + FMA, 4 and 8 lanes (x86_64 only)

pub mod dot_lanes;

#[cfg(target_arch = "x86_64")]
pub mod dot_avx2;

/// Default lane width: two AVX2 registers of f64.
pub const DEFAULT_LANE_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy)]
enum DotImpl {
    Fixed(fn(&[f64], &[f64]) -> f64),
    Runtime,
}

/// A dot-product routine picked once per multiplication for a lane width.
#[derive(Debug, Clone, Copy)]
pub struct DotKernel {
    lanes: usize,
    name: &'static str,
    imp: DotImpl,
}

impl DotKernel {
    /// Picks the fastest routine for `lanes` on this CPU.
    ///
    /// AVX2 + FMA > const-generic lanes > runtime-width lanes.
    ///
    /// # Panics
    ///
    /// Panics if `lanes == 0`.
    pub fn select(lanes: usize) -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                match lanes {
                    4 => return Self::fixed(lanes, "avx2-fma-x4", dot_avx2_x4_entry),
                    8 => return Self::fixed(lanes, "avx2-fma-x8", dot_avx2_x8_entry),
                    _ => {}
                }
            }
        }
        Self::portable(lanes)
    }

    /// Portable routine for `lanes`, never touching target-specific code.
    pub fn portable(lanes: usize) -> Self {
        assert!(lanes > 0, "lane width must be non-zero");
        match lanes {
            4 => Self::fixed(lanes, "portable-x4", dot_lanes::dot_lanes::<4>),
            8 => Self::fixed(lanes, "portable-x8", dot_lanes::dot_lanes::<8>),
            16 => Self::fixed(lanes, "portable-x16", dot_lanes::dot_lanes::<16>),
            _ => DotKernel {
                lanes,
                name: "portable-dyn",
                imp: DotImpl::Runtime,
            },
        }
    }

    fn fixed(lanes: usize, name: &'static str, f: fn(&[f64], &[f64]) -> f64) -> Self {
        DotKernel {
            lanes,
            name,
            imp: DotImpl::Fixed(f),
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        match self.imp {
            DotImpl::Fixed(f) => f(x, y),
            DotImpl::Runtime => dot_lanes::dot_lanes_dyn(x, y, self.lanes),
        }
    }
}

// Only reachable through `DotKernel::select`, after AVX2 and FMA were detected.
#[cfg(target_arch = "x86_64")]
fn dot_avx2_x4_entry(x: &[f64], y: &[f64]) -> f64 {
    unsafe { dot_avx2::dot_avx2_x4(x, y) }
}

#[cfg(target_arch = "x86_64")]
fn dot_avx2_x8_entry(x: &[f64], y: &[f64]) -> f64 {
    unsafe { dot_avx2::dot_avx2_x8(x, y) }
}
