//! Operation traits implemented by runtime clients.

mod conv;

pub use conv::DepthwiseConvOps;
