//! Depthwise convolution operations for sequence models.

use crate::error::Result;
use crate::ops::KernelVariant;
use crate::tensor::Tensor;

/// Depthwise (per-channel) 1D convolution.
///
/// # Memory Layout
///
/// All tensors are channels-last:
/// - **Input**: (B, L, D) - batch, sequence length, channels
/// - **Weight**: (K, D) - one tap per kernel offset and channel
/// - **Bias**: (D,) - one bias per channel
/// - **Output**: (B, L_out, D) with `L_out = L + 2 * padding - K + 1`
///
/// The sequence is zero-padded by `padding` on both ends without building a
/// padded copy. Each output channel depends only on the same input channel
/// and each batch entry only on itself.
///
/// # Data Types
///
/// F32, F16 and BF16. Input, weight and bias must share one dtype. Channels
/// are processed in packed pairs, so D must be even.
pub trait DepthwiseConvOps {
    /// Applies a padded depthwise 1D convolution, returning a new tensor.
    ///
    /// ```
    /// use dwconv1d::prelude::*;
    ///
    /// let input = Tensor::from_slice(&[1.0f32, 1.0, 2.0, 2.0, 3.0, 3.0], &[1, 3, 2]);
    /// let weight = Tensor::from_slice(&[1.0f32; 6], &[3, 2]);
    /// let bias = Tensor::from_slice(&[0.5f32, 0.0], &[2]);
    ///
    /// let out = CpuClient::new().depthwise_conv1d(&input, &weight, &bias, 1)?;
    /// assert_eq!(out.shape(), &[1, 3, 2]);
    /// assert_eq!(out.to_vec::<f32>(), vec![3.5, 3.0, 6.5, 6.0, 5.5, 5.0]);
    /// # Ok::<(), dwconv1d::error::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - `UnsupportedDType` if the input dtype is not F32, F16 or BF16
    /// - `DTypeMismatch` if weight or bias have a different dtype
    /// - `InvalidArgument` for wrong ranks, odd or mismatched channel counts,
    ///   an empty kernel, or a kernel wider than the padded sequence plus one
    fn depthwise_conv1d(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
    ) -> Result<Tensor>;

    /// Same as [`depthwise_conv1d`](Self::depthwise_conv1d), writing into a
    /// caller-allocated `output` of shape (B, L_out, D) and the input's dtype.
    ///
    /// Every element of `output` is overwritten. On error `output` is left
    /// untouched.
    fn depthwise_conv1d_out(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
        output: &mut Tensor,
    ) -> Result<()>;

    /// Same as [`depthwise_conv1d`](Self::depthwise_conv1d) with an explicit
    /// kernel variant instead of the automatic choice.
    ///
    /// Forcing [`KernelVariant::Width3`] requires K = 3 and is allowed for
    /// every supported dtype, including F32.
    fn depthwise_conv1d_with_variant(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
        variant: KernelVariant,
    ) -> Result<Tensor>;
}
