//! Tensor operations
//!
//! - [`conv_common`]: backend-independent validation, output length and
//!   kernel-variant selection
//! - [`DepthwiseConvOps`]: the operation trait, implemented by
//!   [`CpuClient`](crate::runtime::cpu::CpuClient)

pub mod conv_common;
mod cpu;
pub(crate) mod dispatch;
mod traits;

pub use conv_common::{DepthwiseConv1dParams, KernelVariant, output_length};
pub use cpu::depthwise_conv1d;
pub use traits::DepthwiseConvOps;
