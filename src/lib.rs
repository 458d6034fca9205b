//! # dwconv1d
//!
//! **Padded depthwise 1-D convolution over batched sequences.**
//!
//! Given an input of shape `[B, L, D]`, per-channel filter taps `[K, D]` and a
//! bias `[D]`, dwconv1d computes
//!
//! ```text
//! out[b, l, d] = bias[d] + Σ_k  x_pad[b, l + k, d] * weight[k, d]
//! ```
//!
//! where `x_pad` is the input zero-padded by `padding` positions on both ends
//! of the sequence axis, and `L_out = L + 2 * padding - K + 1`.
//!
//! ## Design
//!
//! - **No padded copy**: reads that fall in the padding return zero from a
//!   guarded sampler.
//! - **Packed pairs**: channels are processed two at a time with a lane-wise
//!   fused multiply-add, so `D` must be even.
//! - **Tiled launch**: the output is cut into independent
//!   (batch, position-tile, channel-tile) units run in parallel with rayon.
//! - **Width-3 specialization**: `K = 3` uses an unrolled kernel for F16 and
//!   BF16. F32 always uses the generic loop.
//!
//! ## Quick Start
//!
//! ```rust
//! use dwconv1d::prelude::*;
//!
//! let input = Tensor::from_f64_slice(&[1.0, -1.0, 2.0, -2.0], &[1, 2, 2], DType::BF16)?;
//! let weight = Tensor::from_f64_slice(&[0.5, 0.5, 1.0, 1.0, 0.5, 0.5], &[3, 2], DType::BF16)?;
//! let bias = Tensor::from_f64_slice(&[0.0, 1.0], &[2], DType::BF16)?;
//!
//! let out = depthwise_conv1d(&input, &weight, &bias, 1)?;
//! assert_eq!(out.shape(), &[1, 2, 2]);
//! assert_eq!(out.to_f64_vec()?, vec![2.0, -1.0, 2.5, -1.5]);
//! # Ok::<(), dwconv1d::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded launches

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

pub use ops::depthwise_conv1d;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{DepthwiseConvOps, KernelVariant, depthwise_conv1d, output_length};
    pub use crate::runtime::cpu::{CpuClient, LaunchConfig};
    pub use crate::tensor::Tensor;
}
