//! CPU implementation of depthwise convolution.

use crate::error::{Error, Result};
use crate::ops::conv_common::{DepthwiseConv1dParams, validate_depthwise_conv1d};
use crate::ops::dispatch::dispatch_conv_dtype;
use crate::ops::{DepthwiseConvOps, KernelVariant};
use crate::runtime::cpu::{CpuClient, LaunchGeometry, kernels};
use crate::tensor::Tensor;
use tracing::{debug, trace};

const OP: &str = "depthwise_conv1d";

fn validate(
    input: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    padding: usize,
) -> Result<DepthwiseConv1dParams> {
    validate_depthwise_conv1d(
        input.shape(),
        weight.shape(),
        bias.shape(),
        padding,
        input.dtype(),
        weight.dtype(),
        bias.dtype(),
    )
    .inspect_err(|e| trace!(error = %e, "rejected {} launch", OP))
}

impl CpuClient {
    /// Computes the launch geometry and runs one kernel variant over `output`.
    fn launch_depthwise_conv1d(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        output: &mut Tensor,
        params: &DepthwiseConv1dParams,
        variant: KernelVariant,
    ) -> Result<()> {
        let dtype = input.dtype();
        let geometry = LaunchGeometry::new(params, self.config());

        debug!(
            %dtype,
            variant = variant.name(),
            batch = params.batch,
            length = params.length,
            channels = params.channels,
            kernel_size = params.kernel_size,
            padding = params.padding,
            output_length = params.output_length,
            channel_tiles = geometry.channel_tiles,
            position_tiles = geometry.position_tiles,
            units = geometry.total_units(),
            "launching {}",
            OP
        );

        // Handle empty output
        if output.storage().is_empty() {
            return Ok(());
        }

        let min_units_per_task = self.config().min_units_per_task;

        dispatch_conv_dtype!(dtype, T => {
            let input = input.as_slice::<T>()?;
            let weight = weight.as_slice::<T>()?;
            let bias = bias.as_slice::<T>()?;
            let output = output.as_mut_slice::<T>()?;
            self.install_parallelism(|| {
                kernels::depthwise_conv1d_kernel::<T>(
                    input,
                    weight,
                    bias,
                    output,
                    params,
                    &geometry,
                    variant,
                    min_units_per_task,
                )
            });
        }, OP);

        Ok(())
    }
}

impl DepthwiseConvOps for CpuClient {
    fn depthwise_conv1d(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
    ) -> Result<Tensor> {
        let params = validate(input, weight, bias, padding)?;
        let variant = KernelVariant::select(input.dtype(), params.kernel_size);

        let mut output = Tensor::zeros(&params.output_shape(), input.dtype());
        self.launch_depthwise_conv1d(input, weight, bias, &mut output, &params, variant)?;
        Ok(output)
    }

    fn depthwise_conv1d_out(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
        output: &mut Tensor,
    ) -> Result<()> {
        let params = validate(input, weight, bias, padding)?;
        if output.dtype() != input.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: input.dtype(),
                rhs: output.dtype(),
            });
        }
        if output.shape() != &params.output_shape()[..] {
            return Err(Error::shape_mismatch(&params.output_shape(), output.shape()));
        }
        let variant = KernelVariant::select(input.dtype(), params.kernel_size);

        self.launch_depthwise_conv1d(input, weight, bias, output, &params, variant)
    }

    fn depthwise_conv1d_with_variant(
        &self,
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        padding: usize,
        variant: KernelVariant,
    ) -> Result<Tensor> {
        let params = validate(input, weight, bias, padding)?;
        variant.validate(params.kernel_size)?;

        let mut output = Tensor::zeros(&params.output_shape(), input.dtype());
        self.launch_depthwise_conv1d(input, weight, bias, &mut output, &params, variant)?;
        Ok(output)
    }
}

/// Applies a padded depthwise 1D convolution with a default [`CpuClient`].
///
/// See [`DepthwiseConvOps::depthwise_conv1d`] for shapes, dtypes and errors.
pub fn depthwise_conv1d(
    input: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    padding: usize,
) -> Result<Tensor> {
    CpuClient::new().depthwise_conv1d(input, weight, bias, padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use half::f16;

    #[test]
    fn test_worked_example() {
        let input = Tensor::from_slice(
            &[1.0f32, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0],
            &[1, 5, 2],
        );
        let weight = Tensor::from_slice(&[1.0f32; 6], &[3, 2]);
        let bias = Tensor::from_slice(&[0.0f32; 2], &[2]);

        let out = depthwise_conv1d(&input, &weight, &bias, 1).unwrap();
        assert_eq!(out.shape(), &[1, 5, 2]);
        let data = out.to_vec::<f32>();
        assert_eq!(&data[0..2], &[3.0, 3.0]); // 0+1+2
        assert_eq!(&data[2..4], &[6.0, 6.0]); // 1+2+3
        assert_eq!(&data[8..10], &[9.0, 9.0]); // 4+5+0
    }

    #[test]
    fn test_unsupported_dtype_before_launch() {
        let input = Tensor::from_slice(&[1i32, 2, 3, 4], &[1, 2, 2]);
        let weight = Tensor::from_slice(&[1i32, 1], &[1, 2]);
        let bias = Tensor::from_slice(&[0i32, 0], &[2]);
        let err = CpuClient::new()
            .depthwise_conv1d(&input, &weight, &bias, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedDType {
                dtype: DType::I32,
                op: "depthwise_conv1d"
            }
        ));
    }

    #[test]
    fn test_out_rejects_wrong_output() {
        let client = CpuClient::new();
        let input = Tensor::zeros(&[1, 4, 2], DType::F16);
        let weight = Tensor::zeros(&[3, 2], DType::F16);
        let bias = Tensor::zeros(&[2], DType::F16);

        let mut wrong_shape = Tensor::zeros(&[1, 3, 2], DType::F16);
        let err = client
            .depthwise_conv1d_out(&input, &weight, &bias, 1, &mut wrong_shape)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let mut wrong_dtype = Tensor::zeros(&[1, 4, 2], DType::F32);
        let err = client
            .depthwise_conv1d_out(&input, &weight, &bias, 1, &mut wrong_dtype)
            .unwrap_err();
        assert!(matches!(err, Error::DTypeMismatch { .. }));

        let mut ok = Tensor::from_slice(&[f16::NAN; 8], &[1, 4, 2]);
        client
            .depthwise_conv1d_out(&input, &weight, &bias, 1, &mut ok)
            .unwrap();
        assert!(ok.to_vec::<f16>().iter().all(|v| *v == f16::ZERO));
    }

    #[test]
    fn test_forced_width3_requires_k3() {
        let input = Tensor::zeros(&[1, 4, 2], DType::BF16);
        let weight = Tensor::zeros(&[2, 2], DType::BF16);
        let bias = Tensor::zeros(&[2], DType::BF16);
        let err = CpuClient::new()
            .depthwise_conv1d_with_variant(&input, &weight, &bias, 0, KernelVariant::Width3)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "variant", .. }));
    }

    #[test]
    fn test_empty_output() {
        let input = Tensor::zeros(&[2, 2, 4], DType::F32);
        let weight = Tensor::zeros(&[3, 4], DType::F32);
        let bias = Tensor::zeros(&[4], DType::F32);
        let out = depthwise_conv1d(&input, &weight, &bias, 0).unwrap();
        assert_eq!(out.shape(), &[2, 0, 4]);
        assert_eq!(out.numel(), 0);
    }
}
