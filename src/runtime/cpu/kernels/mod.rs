//! CPU kernel implementations
//!
//! Kernels are generic over [`ConvElement`](crate::dtype::ConvElement) and are
//! instantiated for `f32`, `half::f16` and `half::bf16`.

#![allow(unsafe_op_in_unsafe_fn)] // Tile writes and pair stores go through raw output pointers

pub mod conv;
pub mod pair;

pub use conv::{conv_pair_generic, conv_pair_width3, depthwise_conv1d_kernel, sample_pair};
pub use pair::{Pair, mac};
