//! Storage: host memory tagged with its element type

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

/// Owned host buffer for tensor data
///
/// The buffer is backed by 8-byte words so that typed views of every
/// supported dtype are correctly aligned. The trailing bytes of the last word
/// are padding and never exposed.
#[derive(Clone)]
pub struct Storage {
    /// Backing words
    words: Vec<u64>,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
}

impl Storage {
    /// Create zero-initialized storage for `len` elements of type `dtype`
    pub fn zeroed(len: usize, dtype: DType) -> Self {
        let size_bytes = len * dtype.size_in_bytes();
        Self {
            words: vec![0u64; size_bytes.div_ceil(8)],
            len,
            dtype,
        }
    }

    /// Create storage from existing data with inferred dtype
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        let mut storage = Self::zeroed(data.len(), T::DTYPE);
        let bytes: &[u8] = bytemuck::cast_slice(data);
        storage.bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        storage
    }

    /// Create storage from raw bytes with explicit dtype
    ///
    /// `data.len()` must be a multiple of the dtype's element size.
    pub fn from_bytes(data: &[u8], dtype: DType) -> Result<Self> {
        let elem = dtype.size_in_bytes();
        if data.len() % elem != 0 {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "{} bytes is not a whole number of {} elements",
                    data.len(),
                    dtype
                ),
            ));
        }
        let mut storage = Self::zeroed(data.len() / elem, dtype);
        storage.bytes_mut()[..data.len()].copy_from_slice(data);
        Ok(storage)
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }

    /// Raw bytes of the stored elements
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.size_in_bytes()]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)
    }

    /// Typed view of the stored elements
    ///
    /// Fails with `DTypeMismatch` if `T` does not match the storage dtype.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        self.check_dtype::<T>()?;
        Ok(&bytemuck::cast_slice::<u64, T>(&self.words)[..self.len])
    }

    /// Mutable typed view of the stored elements
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T]> {
        self.check_dtype::<T>()?;
        let len = self.len;
        Ok(&mut bytemuck::cast_slice_mut::<u64, T>(&mut self.words)[..len])
    }

    #[inline]
    fn check_dtype<T: Element>(&self) -> Result<()> {
        if T::DTYPE != self.dtype {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype,
                rhs: T::DTYPE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_from_slice_roundtrip_odd_length() {
        // 3 f16 values = 6 bytes, padded to one 8-byte word
        let data = [f16::from_f32(1.0), f16::from_f32(-2.0), f16::from_f32(0.5)];
        let storage = Storage::from_slice(&data);
        assert_eq!(storage.len(), 3);
        assert_eq!(storage.size_in_bytes(), 6);
        assert_eq!(storage.as_slice::<f16>().unwrap(), &data);
    }

    #[test]
    fn test_typed_view_dtype_mismatch() {
        let storage = Storage::from_slice(&[1.0f32, 2.0]);
        let err = storage.as_slice::<f16>().unwrap_err();
        assert!(matches!(
            err,
            Error::DTypeMismatch {
                lhs: DType::F32,
                rhs: DType::F16
            }
        ));
    }

    #[test]
    fn test_from_bytes() {
        let storage = Storage::from_bytes(&[1, 0, 1, 1], DType::Bool).unwrap();
        assert_eq!(storage.len(), 4);
        assert_eq!(storage.as_bytes(), &[1, 0, 1, 1]);

        assert!(Storage::from_bytes(&[0, 0, 0], DType::F16).is_err());
    }

    #[test]
    fn test_mutable_view() {
        let mut storage = Storage::zeroed(4, DType::F32);
        storage.as_mut_slice::<f32>().unwrap()[2] = 7.0;
        assert_eq!(storage.as_slice::<f32>().unwrap(), &[0.0, 0.0, 7.0, 0.0]);
        assert!(!storage.is_empty());
        assert!(Storage::zeroed(0, DType::F16).is_empty());
    }
}
