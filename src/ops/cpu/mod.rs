//! CPU implementations of the operation traits.

mod conv;

pub use conv::depthwise_conv1d;
