// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Error type for the terrain correction engine's public boundary.

use thiserror::Error;

/// Errors reported by [`crate::TerrainCorrector`].
#[derive(Debug, Error)]
pub enum TerrainError {
    /// The configuration is internally inconsistent (bad dimensions, a
    /// non-positive bound, an out-of-range angle, or an odd `pixel_per_gc`
    /// passed to the packet-8 engine).
    #[error("invalid terrain configuration: {0}")]
    InvalidConfig(String),

    /// The occlusion scene could not be built (e.g. an empty outer DEM).
    #[error("could not build the occlusion scene: {0}")]
    SceneBuild(String),
}
