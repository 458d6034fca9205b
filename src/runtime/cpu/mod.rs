//! CPU runtime implementation
//!
//! Launches are flat grids of independent tiles (see [`launch`]) executed on
//! rayon when the `rayon` feature is enabled and sequentially otherwise.
//! Operations block until every tile has been written.

mod client;
pub mod kernels;
pub mod launch;

pub use client::CpuClient;
pub use launch::{LaunchConfig, LaunchGeometry, Tile};
