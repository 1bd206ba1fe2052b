// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Ray-traced correction of direct shortwave solar radiation over complex terrain.
//!
//! Given a fine digital elevation model (DEM) and a coarser aggregation grid
//! overlaid on it, this crate computes, per aggregation cell, the factor that
//! corrects a plane-parallel direct-beam irradiance for the local slope,
//! aspect and self/terrain shadowing of the subgrid-scale topography.

pub mod config;
pub mod dem;
pub mod engine;
pub mod error;
pub mod facade;
pub mod indexer;
pub mod refraction;
pub mod scene;
pub mod vector;

pub use config::{GeomType, TerrainConfig};
pub use error::TerrainError;
pub use facade::TerrainCorrector;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
