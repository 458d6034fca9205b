//! Tensor types
//!
//! This module provides the host-resident `Tensor` type consumed and produced
//! by the convolution operations.

mod core;
mod shape;
mod storage;

pub use core::Tensor;
pub use shape::Shape;
pub use storage::Storage;
