//! DType dispatch for the convolution kernels
//!
//! `dispatch_conv_dtype!` maps a runtime `DType` onto the closed set of
//! representations the kernels are compiled for, binding `T` to the concrete
//! Rust type inside the body:
//!
//! - `F32` -> `f32`
//! - `F16` -> `half::f16`
//! - `BF16` -> `half::bf16`
//!
//! Every other dtype returns `UnsupportedDType` from the enclosing function
//! before the body runs.
//!
//! ```ignore
//! fn my_operation(dtype: DType) -> Result<()> {
//!     dispatch_conv_dtype!(dtype, T => {
//!         let size = std::mem::size_of::<T>();
//!     }, "my_operation");
//!     Ok(())
//! }
//! ```

macro_rules! dispatch_conv_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                type $T = half::f16;
                $body
            }
            $crate::dtype::DType::BF16 => {
                type $T = half::bf16;
                $body
            }
            _ => {
                return Err($crate::error::Error::UnsupportedDType {
                    dtype: $dtype,
                    op: $error_op,
                })
            }
        }
    };
}

pub(crate) use dispatch_conv_dtype;

#[cfg(test)]
mod tests {
    use crate::dtype::{DType, Element};
    use crate::error::{Error, Result};

    fn element_size(dtype: DType) -> Result<(usize, DType)> {
        let info;
        dispatch_conv_dtype!(dtype, T => {
            info = (std::mem::size_of::<T>(), T::DTYPE);
        }, "element_size");
        Ok(info)
    }

    #[test]
    fn test_dispatch_closed_set() {
        assert_eq!(element_size(DType::F32).unwrap(), (4, DType::F32));
        assert_eq!(element_size(DType::F16).unwrap(), (2, DType::F16));
        assert_eq!(element_size(DType::BF16).unwrap(), (2, DType::BF16));
    }

    #[test]
    fn test_dispatch_rejects_other_dtypes() {
        for dtype in [DType::F64, DType::I32, DType::U8, DType::Bool] {
            let err = element_size(dtype).unwrap_err();
            assert!(matches!(err, Error::UnsupportedDType { op: "element_size", .. }));
        }
    }
}
