//! Element traits for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use half::{bf16, f16};
use std::fmt::Debug;

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to the runtime dtype system.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
pub trait Element: Copy + Clone + Send + Sync + Pod + Zeroable + Debug + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;
}

/// Element types the convolution kernels are instantiated for.
///
/// Implemented for exactly `f32`, `half::f16` and `half::bf16`.
pub trait ConvElement: Element {
    /// Fused multiply-add `self * b + c` in this representation.
    ///
    /// The 16-bit types widen to `f32` and compute the sum rounded to odd,
    /// so the narrowing back to 16 bits is the only rounding that counts.
    fn mul_add(self, b: Self, c: Self) -> Self;
}

/// `a * b + c` in `f32`, rounded to odd instead of to nearest.
///
/// An inexact result always lands on an odd significand, so a later rounding
/// to a format with at least two fewer significand bits gives the same result
/// as rounding the exact value once. Operands must be widened 16-bit floats:
/// their product is then exact in `f64`.
#[inline]
fn mul_add_round_to_odd(a: f32, b: f32, c: f32) -> f32 {
    let r = a.mul_add(b, c);
    if !r.is_finite() || r.to_bits() & 1 == 1 {
        return r;
    }

    // Exact p + c = s + e (TwoSum)
    let p = f64::from(a) * f64::from(b);
    let c = f64::from(c);
    let s = p + c;
    let bv = s - p;
    let e = (p - (s - bv)) + (c - bv);
    // s and r both round the same value, so s - r is exact
    let residual = (s - f64::from(r)) + e;

    if residual == 0.0 {
        r
    } else if r == 0.0 {
        f32::from_bits(1).copysign(residual as f32)
    } else if (residual > 0.0) == (r > 0.0) {
        f32::from_bits(r.to_bits() + 1)
    } else {
        f32::from_bits(r.to_bits() - 1)
    }
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr, $zero:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            #[inline]
            fn zero() -> Self {
                $zero
            }
        }
    };
}

impl_element!(f64, DType::F64, 0.0);
impl_element!(f32, DType::F32, 0.0);
impl_element!(i64, DType::I64, 0);
impl_element!(i32, DType::I32, 0);
impl_element!(u8, DType::U8, 0);

// Note: bool doesn't implement Pod, so Bool tensors use u8 storage and have
// no Element impl.

impl Element for f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }

    #[inline]
    fn zero() -> Self {
        f16::ZERO
    }
}

impl Element for bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        bf16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        bf16::from_f64(v)
    }

    #[inline]
    fn zero() -> Self {
        bf16::ZERO
    }
}

impl ConvElement for f32 {
    #[inline]
    fn mul_add(self, b: Self, c: Self) -> Self {
        f32::mul_add(self, b, c)
    }
}

impl ConvElement for f16 {
    #[inline]
    fn mul_add(self, b: Self, c: Self) -> Self {
        f16::from_f32(mul_add_round_to_odd(self.to_f32(), b.to_f32(), c.to_f32()))
    }
}

impl ConvElement for bf16 {
    #[inline]
    fn mul_add(self, b: Self, c: Self) -> Self {
        bf16::from_f32(mul_add_round_to_odd(self.to_f32(), b.to_f32(), c.to_f32()))
    }
}
