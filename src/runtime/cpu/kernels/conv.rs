//! CPU depthwise convolution kernels.
//!
//! Direct channels-last convolution over packed channel pairs. The padded
//! sequence is never built: [`sample_pair`] answers reads that fall in the
//! padding with zero.

use super::pair::{Pair, mac};
use crate::dtype::ConvElement;
use crate::ops::{DepthwiseConv1dParams, KernelVariant};
use crate::runtime::cpu::launch::{LaunchGeometry, Tile};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Reads the input pair feeding output position `l` through tap `k`.
///
/// Returns zero when the padded position `l + k` lies in the leading padding
/// (`l + k < padding`) or in the trailing padding
/// (`l + k > padded_length - (padding + 1)`, written here as
/// `l + k >= padding + length` so it cannot underflow).
#[inline(always)]
pub fn sample_pair<T: ConvElement>(
    input: &[T],
    params: &DepthwiseConv1dParams,
    b: usize,
    l: usize,
    k: usize,
    pair: usize,
) -> Pair<T> {
    let pos = l + k;
    if pos < params.padding || pos >= params.padding + params.length {
        return Pair::zero();
    }
    let row = b * params.length + (pos - params.padding);
    Pair::load(input, row * params.channels + 2 * pair)
}

/// One output pair for any kernel width.
#[inline(always)]
pub fn conv_pair_generic<T: ConvElement>(
    input: &[T],
    weight: &[T],
    bias: &[T],
    params: &DepthwiseConv1dParams,
    b: usize,
    l: usize,
    pair: usize,
) -> Pair<T> {
    let c = 2 * pair;
    let mut acc = Pair::load(bias, c);
    for k in 0..params.kernel_size {
        let w = Pair::load(weight, k * params.channels + c);
        acc = mac(sample_pair(input, params, b, l, k, pair), w, acc);
    }
    acc
}

/// One output pair for `kernel_size == 3`, taps unrolled.
///
/// Performs the same three `mac` steps in the same order as
/// [`conv_pair_generic`], so both produce identical bits.
#[inline(always)]
pub fn conv_pair_width3<T: ConvElement>(
    input: &[T],
    weight: &[T],
    bias: &[T],
    params: &DepthwiseConv1dParams,
    b: usize,
    l: usize,
    pair: usize,
) -> Pair<T> {
    debug_assert_eq!(params.kernel_size, 3);
    let c = 2 * pair;
    let d = params.channels;
    let acc = Pair::load(bias, c);
    let acc = mac(
        sample_pair(input, params, b, l, 0, pair),
        Pair::load(weight, c),
        acc,
    );
    let acc = mac(
        sample_pair(input, params, b, l, 1, pair),
        Pair::load(weight, d + c),
        acc,
    );
    mac(
        sample_pair(input, params, b, l, 2, pair),
        Pair::load(weight, 2 * d + c),
        acc,
    )
}

/// Computes and writes every in-bounds output pair of one tile.
///
/// # Safety
///
/// `output` must point to `params.output_numel()` writable elements, and no
/// other thread may write the elements belonging to `tile`.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
unsafe fn run_tile<T, F>(
    input: &[T],
    weight: &[T],
    bias: &[T],
    output: *mut T,
    params: &DepthwiseConv1dParams,
    geometry: &LaunchGeometry,
    tile: Tile,
    compute: &F,
) where
    T: ConvElement,
    F: Fn(&[T], &[T], &[T], &DepthwiseConv1dParams, usize, usize, usize) -> Pair<T>,
{
    if tile.batch >= params.batch {
        return;
    }
    let pairs = params.channel_pairs();
    let pair_base = tile.channel_tile * geometry.pairs_per_unit();
    let l_base = tile.position_tile * geometry.positions_per_unit;

    for i in 0..geometry.positions_per_unit {
        let l = l_base + i;
        if l >= params.output_length {
            break;
        }
        let row = (tile.batch * params.output_length + l) * params.channels;
        for j in 0..geometry.pairs_per_lane {
            for lane in 0..geometry.lanes_per_group {
                let pair = pair_base + j * geometry.lanes_per_group + lane;
                if pair >= pairs {
                    break;
                }
                let acc = compute(input, weight, bias, params, tile.batch, l, pair);
                acc.store(output.add(row + 2 * pair));
            }
        }
    }
}

/// Runs every unit of `geometry`, in parallel when the `rayon` feature is on.
#[allow(clippy::too_many_arguments)]
fn launch_units<T, F>(
    input: &[T],
    weight: &[T],
    bias: &[T],
    output: &mut [T],
    params: &DepthwiseConv1dParams,
    geometry: &LaunchGeometry,
    min_units_per_task: usize,
    compute: &F,
) where
    T: ConvElement,
    F: Fn(&[T], &[T], &[T], &DepthwiseConv1dParams, usize, usize, usize) -> Pair<T> + Sync,
{
    let out_addr = output.as_mut_ptr() as usize;

    #[cfg(feature = "rayon")]
    {
        (0..geometry.total_units())
            .into_par_iter()
            .with_min_len(min_units_per_task)
            .for_each(|unit| unsafe {
                let out_ptr = out_addr as *mut T;
                run_tile(
                    input,
                    weight,
                    bias,
                    out_ptr,
                    params,
                    geometry,
                    geometry.tile(unit),
                    compute,
                );
            });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = min_units_per_task;
        for unit in 0..geometry.total_units() {
            unsafe {
                run_tile(
                    input,
                    weight,
                    bias,
                    out_addr as *mut T,
                    params,
                    geometry,
                    geometry.tile(unit),
                    compute,
                );
            }
        }
    }
}

/// Depthwise 1D convolution kernel.
///
/// Every element of `output` is written exactly once. Tiles are disjoint, so
/// units share no mutable state.
///
/// # Panics
///
/// Panics if a slice is shorter than `params` describes, or if `variant` is
/// `Width3` while `params.kernel_size != 3` (debug builds).
#[allow(clippy::too_many_arguments)]
pub fn depthwise_conv1d_kernel<T: ConvElement>(
    input: &[T],
    weight: &[T],
    bias: &[T],
    output: &mut [T],
    params: &DepthwiseConv1dParams,
    geometry: &LaunchGeometry,
    variant: KernelVariant,
    min_units_per_task: usize,
) {
    let in_len = params.batch * params.length * params.channels;
    assert!(input.len() >= in_len, "input shorter than {}", in_len);
    assert!(weight.len() >= params.kernel_size * params.channels);
    assert!(bias.len() >= params.channels);
    assert_eq!(output.len(), params.output_numel());

    match variant {
        KernelVariant::Width3 => launch_units(
            input,
            weight,
            bias,
            output,
            params,
            geometry,
            min_units_per_task,
            &conv_pair_width3::<T>,
        ),
        KernelVariant::Generic => launch_units(
            input,
            weight,
            bias,
            output,
            params,
            geometry,
            min_units_per_task,
            &conv_pair_generic::<T>,
        ),
    }
}
