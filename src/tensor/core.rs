//! Core Tensor type

use super::{Shape, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::fmt;

/// Contiguous row-major n-dimensional array in host memory
///
/// `Tensor` carries its element type at runtime so that operations can pick
/// a typed code path at the call boundary. It consists of:
/// - **Storage**: Owned, dtype-tagged buffer
/// - **Shape**: Dimensions, outermost first
///
/// # Example
///
/// ```
/// use dwconv1d::tensor::Tensor;
///
/// let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]);
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
/// ```
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    shape: Shape,
}

impl Tensor {
    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Self {
        Self::try_from_slice(data, shape).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions.
    pub fn try_from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let shape = Shape::from(shape);
        if data.len() != shape.numel() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_slice(data),
            shape,
        })
    }

    /// Create a tensor that takes ownership of `data`
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions.
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::try_from_slice(&data, shape)
    }

    /// Create a tensor from raw little-endian bytes with explicit dtype
    ///
    /// This is the only way to build tensors of dtypes without an
    /// [`Element`] impl, such as `Bool`.
    pub fn from_bytes(data: &[u8], shape: &[usize], dtype: DType) -> Result<Self> {
        let shape = Shape::from(shape);
        let storage = Storage::from_bytes(data, dtype)?;
        if storage.len() != shape.numel() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![storage.len()],
            });
        }
        Ok(Self { storage, shape })
    }

    /// Create a tensor by converting f64 values into `dtype`
    ///
    /// Values are rounded with the target type's `from_f64` conversion.
    pub fn from_f64_slice(data: &[f64], shape: &[usize], dtype: DType) -> Result<Self> {
        macro_rules! convert {
            ($T:ty) => {{
                let converted: Vec<$T> = data.iter().map(|&v| <$T>::from_f64(v)).collect();
                Self::try_from_slice(&converted, shape)
            }};
        }

        match dtype {
            DType::F64 => Self::try_from_slice(data, shape),
            DType::F32 => convert!(f32),
            DType::F16 => convert!(half::f16),
            DType::BF16 => convert!(half::bf16),
            DType::I64 => convert!(i64),
            DType::I32 => convert!(i32),
            DType::U8 => convert!(u8),
            DType::Bool => Err(Error::unsupported_dtype(dtype, "from_f64_slice")),
        }
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let shape = Shape::from(shape);
        Self {
            storage: Storage::zeroed(shape.numel(), dtype),
            shape,
        }
    }

    // ===== Accessors =====

    /// Get the underlying storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Get total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    // ===== Data Access =====

    /// Borrow the elements as a typed slice
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        self.storage.as_slice()
    }

    /// Borrow the elements as a mutable typed slice
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T]> {
        self.storage.as_mut_slice()
    }

    /// Copy tensor data to a Vec
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the tensor's dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        self.as_slice::<T>()
            .expect("Tensor::to_vec called with wrong element type")
            .to_vec()
    }

    /// Copy tensor data to a Vec<f64>, converting from whatever the dtype is
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        macro_rules! widen {
            ($T:ty) => {
                Ok(self.as_slice::<$T>()?.iter().map(|v| v.to_f64()).collect())
            };
        }

        match self.dtype() {
            DType::F64 => Ok(self.as_slice::<f64>()?.to_vec()),
            DType::F32 => widen!(f32),
            DType::F16 => widen!(half::f16),
            DType::BF16 => widen!(half::bf16),
            DType::I64 => widen!(i64),
            DType::I32 => widen!(i32),
            DType::U8 => widen!(u8),
            DType::Bool => Ok(self
                .storage
                .as_bytes()
                .iter()
                .map(|&b| if b != 0 { 1.0 } else { 0.0 })
                .collect()),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("dtype", &self.dtype())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::bf16;

    #[test]
    fn test_from_slice_shape_check() {
        let err = Tensor::try_from_slice(&[1.0f32, 2.0, 3.0], &[2, 2]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_vec() {
        let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[1, 3, 2]).unwrap();
        assert_eq!(t.shape(), &[1, 3, 2]);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let err = Tensor::from_vec(vec![bf16::ZERO; 5], &[1, 3, 2]).unwrap_err();
        match err {
            Error::ShapeMismatch { expected, got } => {
                assert_eq!(expected, vec![1, 3, 2]);
                assert_eq!(got, vec![5]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(&[2, 3, 4], DType::BF16);
        assert_eq!(t.numel(), 24);
        assert_eq!(t.ndim(), 3);
        assert!(t.to_vec::<bf16>().iter().all(|v| *v == bf16::ZERO));
    }

    #[test]
    fn test_from_f64_slice_rounds_to_dtype() {
        let t = Tensor::from_f64_slice(&[1.0, 1.0 + 1.0 / 1024.0], &[2], DType::BF16).unwrap();
        assert_eq!(t.dtype(), DType::BF16);
        // bf16 has 7 mantissa bits, so 1 + 2^-10 rounds to 1
        assert_eq!(t.to_f64_vec().unwrap(), vec![1.0, 1.0]);

        assert!(Tensor::from_f64_slice(&[1.0], &[1], DType::Bool).is_err());
    }

    #[test]
    fn test_from_bytes_bool() {
        let t = Tensor::from_bytes(&[1, 0, 1, 0], &[2, 2], DType::Bool).unwrap();
        assert_eq!(t.to_f64_vec().unwrap(), vec![1.0, 0.0, 1.0, 0.0]);
        assert!(Tensor::from_bytes(&[1, 0, 1], &[2, 2], DType::Bool).is_err());
    }

    #[test]
    fn test_as_slice_wrong_type() {
        let t = Tensor::from_slice(&[1i32, 2], &[2]);
        assert!(t.as_slice::<f32>().is_err());
        assert_eq!(t.as_slice::<i32>().unwrap(), &[1, 2]);
    }
}
