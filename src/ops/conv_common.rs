//! Shared validation and utility functions for depthwise convolution.
//!
//! All shape and dtype preconditions are checked here, before any kernel is
//! selected, so that a failing call never touches its output.

use crate::dtype::{DType, DTypeSet};
use crate::error::{Error, Result};

/// Validates that a tensor has the expected number of dimensions.
#[inline]
pub fn validate_rank(
    shape: &[usize],
    rank: usize,
    arg_name: &'static str,
    op: &'static str,
) -> Result<()> {
    if shape.len() != rank {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!("{} expects {}D tensor, got {}D", op, rank, shape.len()),
        });
    }
    Ok(())
}

/// Validates that a dtype is one the convolution kernels are built for.
#[inline]
pub fn validate_conv_dtype(dtype: DType, op: &'static str) -> Result<()> {
    if !DTypeSet::CONV.contains(dtype) {
        return Err(Error::UnsupportedDType { dtype, op });
    }
    Ok(())
}

/// Validates that an operand has the same dtype as the input.
#[inline]
pub fn validate_same_dtype(input_dtype: DType, other_dtype: DType) -> Result<()> {
    if other_dtype != input_dtype {
        return Err(Error::DTypeMismatch {
            lhs: input_dtype,
            rhs: other_dtype,
        });
    }
    Ok(())
}

/// Validates that the channel count can be split into packed pairs.
#[inline]
pub fn validate_even_channels(channels: usize, op: &'static str) -> Result<()> {
    if !channels.is_multiple_of(2) {
        return Err(Error::InvalidArgument {
            arg: "input",
            reason: format!(
                "{} processes channels in pairs and requires an even channel count, got {}",
                op, channels
            ),
        });
    }
    Ok(())
}

/// Validates that an operand's channel dimension matches the input's.
#[inline]
pub fn validate_channels(
    channels: usize,
    got: usize,
    arg_name: &'static str,
    op: &'static str,
) -> Result<()> {
    if got != channels {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!(
                "{} {} has {} channels, input has {}",
                op, arg_name, got, channels
            ),
        });
    }
    Ok(())
}

/// Computes `length + 2 * padding`.
///
/// Fails if `length + 2 * padding + 1` overflows `usize`.
pub fn padded_length(length: usize, padding: usize) -> Result<usize> {
    padding
        .checked_mul(2)
        .and_then(|both| both.checked_add(length))
        .and_then(|padded| padded.checked_add(1).map(|_| padded))
        .ok_or_else(|| {
            Error::invalid_argument(
                "padding",
                format!("padding {} overflows for length {}", padding, length),
            )
        })
}

/// Computes the output length of a padded stride-1 convolution.
///
/// `L_out = L + 2 * padding - K + 1`. A kernel exactly one wider than the
/// padded sequence yields an empty output; anything wider is rejected.
pub fn output_length(length: usize, kernel_size: usize, padding: usize) -> Result<usize> {
    if kernel_size == 0 {
        return Err(Error::invalid_argument(
            "weight",
            "kernel size must be at least 1",
        ));
    }
    let padded_length = padded_length(length, padding)?;
    (padded_length + 1)
        .checked_sub(kernel_size)
        .ok_or_else(|| {
            Error::invalid_argument(
                "weight",
                format!(
                    "kernel size {} exceeds padded length {} + 1",
                    kernel_size, padded_length
                ),
            )
        })
}

/// Kernel variant chosen once per launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelVariant {
    /// Taps unrolled for `kernel_size == 3`
    Width3,
    /// Loop over any kernel width
    Generic,
}

impl KernelVariant {
    /// Picks the variant used when the caller does not force one.
    ///
    /// The unrolled kernel is used only for the dtypes in
    /// [`DTypeSet::WIDTH3_ELIGIBLE`]; `F32` runs the generic loop for every
    /// kernel width.
    pub fn select(dtype: DType, kernel_size: usize) -> Self {
        if kernel_size == 3 && DTypeSet::WIDTH3_ELIGIBLE.contains(dtype) {
            KernelVariant::Width3
        } else {
            KernelVariant::Generic
        }
    }

    /// Checks that this variant can run a kernel of the given width.
    pub fn validate(self, kernel_size: usize) -> Result<()> {
        if self == KernelVariant::Width3 && kernel_size != 3 {
            return Err(Error::invalid_argument(
                "variant",
                format!("width3 kernel requires kernel size 3, got {}", kernel_size),
            ));
        }
        Ok(())
    }

    /// Returns the name of the variant for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            KernelVariant::Width3 => "width3",
            KernelVariant::Generic => "generic",
        }
    }
}

/// Parameters for depthwise_conv1d after validation.
///
/// Layouts are channels-last:
/// - input `[batch, length, channels]`
/// - weight `[kernel_size, channels]`
/// - bias `[channels]`
/// - output `[batch, output_length, channels]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthwiseConv1dParams {
    /// B
    pub batch: usize,
    /// L, the unpadded sequence length
    pub length: usize,
    /// D, always even
    pub channels: usize,
    /// K
    pub kernel_size: usize,
    /// Zero positions added before and after the sequence
    pub padding: usize,
    /// `length + 2 * padding`; the padded sequence is never materialized
    pub padded_length: usize,
    /// `padded_length - kernel_size + 1`
    pub output_length: usize,
}

impl DepthwiseConv1dParams {
    /// Number of packed channel pairs
    #[inline]
    pub fn channel_pairs(&self) -> usize {
        self.channels / 2
    }

    /// Output shape `[batch, output_length, channels]`
    #[inline]
    pub fn output_shape(&self) -> [usize; 3] {
        [self.batch, self.output_length, self.channels]
    }

    /// Total number of output elements
    #[inline]
    pub fn output_numel(&self) -> usize {
        self.batch * self.output_length * self.channels
    }
}

/// Validates and extracts parameters for depthwise_conv1d.
pub fn validate_depthwise_conv1d(
    input_shape: &[usize],
    weight_shape: &[usize],
    bias_shape: &[usize],
    padding: usize,
    input_dtype: DType,
    weight_dtype: DType,
    bias_dtype: DType,
) -> Result<DepthwiseConv1dParams> {
    const OP: &str = "depthwise_conv1d";

    // Validate tensor dimensions
    validate_rank(input_shape, 3, "input", OP)?;
    validate_rank(weight_shape, 2, "weight", OP)?;
    validate_rank(bias_shape, 1, "bias", OP)?;

    // Validate dtypes
    validate_conv_dtype(input_dtype, OP)?;
    validate_same_dtype(input_dtype, weight_dtype)?;
    validate_same_dtype(input_dtype, bias_dtype)?;

    let batch = input_shape[0];
    let length = input_shape[1];
    let channels = input_shape[2];
    let kernel_size = weight_shape[0];

    validate_even_channels(channels, OP)?;
    validate_channels(channels, weight_shape[1], "weight", OP)?;
    validate_channels(channels, bias_shape[0], "bias", OP)?;

    let output_length = output_length(length, kernel_size, padding)?;

    Ok(DepthwiseConv1dParams {
        batch,
        length,
        channels,
        kernel_size,
        padding,
        padded_length: padded_length(length, padding)?,
        output_length,
    })
}
