//! Common test utilities
#![allow(dead_code)]

use dwconv1d::dtype::DType;
use dwconv1d::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Input, weight and bias for one convolution, kept in f64 so every
/// representation can be built from the same logical values.
pub struct ConvCase {
    pub batch: usize,
    pub length: usize,
    pub channels: usize,
    pub kernel_size: usize,
    pub input: Vec<f64>,
    pub weight: Vec<f64>,
    pub bias: Vec<f64>,
}

impl ConvCase {
    /// Draws values uniformly from `[-0.5, 0.5)` with a fixed seed.
    pub fn random(
        seed: u64,
        batch: usize,
        length: usize,
        channels: usize,
        kernel_size: usize,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            batch,
            length,
            channels,
            kernel_size,
            input: random_values(&mut rng, batch * length * channels),
            weight: random_values(&mut rng, kernel_size * channels),
            bias: random_values(&mut rng, channels),
        }
    }

    /// Builds the three operand tensors in `dtype`.
    pub fn tensors(&self, dtype: DType) -> (Tensor, Tensor, Tensor) {
        (
            Tensor::from_f64_slice(
                &self.input,
                &[self.batch, self.length, self.channels],
                dtype,
            )
            .unwrap(),
            Tensor::from_f64_slice(&self.weight, &[self.kernel_size, self.channels], dtype)
                .unwrap(),
            Tensor::from_f64_slice(&self.bias, &[self.channels], dtype).unwrap(),
        )
    }

    /// Reference result in f64, computed on an explicitly zero-padded copy.
    pub fn reference(&self, padding: usize) -> Vec<f64> {
        reference_depthwise_conv1d(
            &self.input,
            &self.weight,
            &self.bias,
            self.batch,
            self.length,
            self.channels,
            self.kernel_size,
            padding,
        )
    }
}

pub fn random_values(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.random_range(-0.5..0.5)).collect()
}

/// Materializes the zero-padded sequence and runs the plain triple loop.
#[allow(clippy::too_many_arguments)]
pub fn reference_depthwise_conv1d(
    input: &[f64],
    weight: &[f64],
    bias: &[f64],
    batch: usize,
    length: usize,
    channels: usize,
    kernel_size: usize,
    padding: usize,
) -> Vec<f64> {
    let padded_length = length + 2 * padding;
    let mut padded = vec![0.0; batch * padded_length * channels];
    for b in 0..batch {
        for l in 0..length {
            let src = (b * length + l) * channels;
            let dst = (b * padded_length + l + padding) * channels;
            padded[dst..dst + channels].copy_from_slice(&input[src..src + channels]);
        }
    }

    let output_length = padded_length + 1 - kernel_size;
    let mut out = Vec::with_capacity(batch * output_length * channels);
    for b in 0..batch {
        for l in 0..output_length {
            for d in 0..channels {
                let mut acc = bias[d];
                for k in 0..kernel_size {
                    acc += padded[(b * padded_length + l + k) * channels + d]
                        * weight[k * channels + d];
                }
                out.push(acc);
            }
        }
    }
    out
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Returns (rtol, atol) for results computed on inputs in `[-0.5, 0.5)`
/// with kernels of up to 5 taps.
pub fn tolerance_for_dtype(dtype: DType) -> (f64, f64) {
    match dtype {
        DType::F32 => (1e-5, 1e-5),
        DType::F16 => (0.0, 8e-3),
        DType::BF16 => (0.0, 4e-2),
        _ => (1e-12, 1e-12),
    }
}

/// Asserts that two tensors hold exactly the same bits.
pub fn assert_bitwise_eq(a: &Tensor, b: &Tensor, msg: &str) {
    assert_eq!(a.dtype(), b.dtype(), "{}: dtype mismatch", msg);
    assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", msg);
    assert_eq!(
        a.storage().as_bytes(),
        b.storage().as_bytes(),
        "{}: contents differ",
        msg
    );
}
