//! Launch geometry for the depthwise convolution kernels
//!
//! The output `[batch, output_length, channels]` is cut into independent
//! units laid out like a three-axis GPU grid:
//!
//! ```text
//! x: channel tiles   ceil(channels/2 / (lanes_per_group * pairs_per_lane))
//! y: position tiles  ceil(output_length / positions_per_unit)
//! z: batch           batch
//! ```
//!
//! Inside a unit, lane `t` of the group handles channel pairs
//! `tile_start + j * lanes_per_group + t` for `j < pairs_per_lane`, for each of
//! the unit's `positions_per_unit` output positions. Units never overlap, so
//! they may run in any order.

use crate::error::{Error, Result};
use crate::ops::DepthwiseConv1dParams;

/// Default number of lanes working side by side along the channel axis
pub const DEFAULT_LANES_PER_GROUP: usize = 32;
/// Default number of channel pairs each lane handles
pub const DEFAULT_PAIRS_PER_LANE: usize = 2;
/// Default number of output positions each unit handles
pub const DEFAULT_POSITIONS_PER_UNIT: usize = 4;

/// Tiling factors and scheduling grain for a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Lanes per unit along the channel axis
    pub lanes_per_group: usize,
    /// Channel pairs per lane
    pub pairs_per_lane: usize,
    /// Output positions per unit
    pub positions_per_unit: usize,
    /// Minimum number of units a parallel task processes
    pub min_units_per_task: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            lanes_per_group: DEFAULT_LANES_PER_GROUP,
            pairs_per_lane: DEFAULT_PAIRS_PER_LANE,
            positions_per_unit: DEFAULT_POSITIONS_PER_UNIT,
            min_units_per_task: 1,
        }
    }
}

impl LaunchConfig {
    /// Set lanes per group
    pub fn with_lanes_per_group(mut self, lanes: usize) -> Self {
        self.lanes_per_group = lanes;
        self
    }

    /// Set channel pairs per lane
    pub fn with_pairs_per_lane(mut self, pairs: usize) -> Self {
        self.pairs_per_lane = pairs;
        self
    }

    /// Set output positions per unit
    pub fn with_positions_per_unit(mut self, positions: usize) -> Self {
        self.positions_per_unit = positions;
        self
    }

    /// Set the minimum number of units per parallel task
    pub fn with_min_units_per_task(mut self, units: usize) -> Self {
        self.min_units_per_task = units;
        self
    }

    /// Channel pairs covered by one unit
    #[inline]
    pub fn pairs_per_unit(&self) -> usize {
        self.lanes_per_group * self.pairs_per_lane
    }

    /// Rejects zero factors, which would produce an empty grid.
    pub fn validate(&self) -> Result<()> {
        let factors = [
            ("lanes_per_group", self.lanes_per_group),
            ("pairs_per_lane", self.pairs_per_lane),
            ("positions_per_unit", self.positions_per_unit),
            ("min_units_per_task", self.min_units_per_task),
        ];
        for (name, value) in factors {
            if value == 0 {
                return Err(Error::InvalidArgument {
                    arg: name,
                    reason: format!("launch config requires {} > 0, got 0", name),
                });
            }
        }
        Ok(())
    }
}

/// Grid of independent units for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    /// Units along the channel axis (x)
    pub channel_tiles: usize,
    /// Units along the position axis (y)
    pub position_tiles: usize,
    /// Units along the batch axis (z), one per batch entry
    pub batch_tiles: usize,
    /// Lanes per unit along the channel axis
    pub lanes_per_group: usize,
    /// Channel pairs per lane
    pub pairs_per_lane: usize,
    /// Output positions per unit
    pub positions_per_unit: usize,
}

impl LaunchGeometry {
    /// Computes the grid covering the whole output of `params`.
    ///
    /// `config` must have passed [`LaunchConfig::validate`].
    pub fn new(params: &DepthwiseConv1dParams, config: &LaunchConfig) -> Self {
        Self {
            channel_tiles: params.channel_pairs().div_ceil(config.pairs_per_unit()),
            position_tiles: params.output_length.div_ceil(config.positions_per_unit),
            batch_tiles: params.batch,
            lanes_per_group: config.lanes_per_group,
            pairs_per_lane: config.pairs_per_lane,
            positions_per_unit: config.positions_per_unit,
        }
    }

    /// Channel pairs covered by one unit
    #[inline]
    pub fn pairs_per_unit(&self) -> usize {
        self.lanes_per_group * self.pairs_per_lane
    }

    /// Total number of units in the grid
    #[inline]
    pub fn total_units(&self) -> usize {
        self.channel_tiles * self.position_tiles * self.batch_tiles
    }

    /// Decodes a flat unit index, channel tile fastest.
    #[inline]
    pub fn tile(&self, unit: usize) -> Tile {
        let channel_tile = unit % self.channel_tiles;
        let rest = unit / self.channel_tiles;
        Tile {
            channel_tile,
            position_tile: rest % self.position_tiles,
            batch: rest / self.position_tiles,
        }
    }
}

/// Coordinates of one unit in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Index along x
    pub channel_tile: usize,
    /// Index along y
    pub position_tile: usize,
    /// Batch entry (z)
    pub batch: usize,
}
