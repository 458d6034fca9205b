//! Packed-pair lanes and the multiply-accumulate unit.
//!
//! Channels are processed two at a time. A [`Pair`] is the CPU counterpart
//! of a `half2`/`bfloat162`/`float2` register: two scalars of one
//! representation moved and combined together.

use crate::dtype::ConvElement;

/// Two adjacent channel values of the same representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair<T>(pub T, pub T);

impl<T: ConvElement> Pair<T> {
    /// Both lanes set to the representation's zero.
    #[inline(always)]
    pub fn zero() -> Self {
        Pair(T::zero(), T::zero())
    }

    /// Loads `data[offset]` and `data[offset + 1]`.
    #[inline(always)]
    pub fn load(data: &[T], offset: usize) -> Self {
        Pair(data[offset], data[offset + 1])
    }

    /// Writes both lanes to `dst` and `dst + 1`.
    ///
    /// # Safety
    ///
    /// `dst` and `dst + 1` must be valid for writes and not accessed
    /// concurrently by anyone else.
    #[inline(always)]
    pub unsafe fn store(self, dst: *mut T) {
        *dst = self.0;
        *dst.add(1) = self.1;
    }
}

/// Lane-wise fused multiply-add: `(a.0 * b.0 + c.0, a.1 * b.1 + c.1)`.
#[inline(always)]
pub fn mac<T: ConvElement>(a: Pair<T>, b: Pair<T>, c: Pair<T>) -> Pair<T> {
    Pair(a.0.mul_add(b.0, c.0), a.1.mul_add(b.1, c.1))
}
