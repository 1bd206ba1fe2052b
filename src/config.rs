// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Static configuration for a [`crate::TerrainCorrector`] instance.

use serde::{Deserialize, Serialize};

/// Occlusion-scene geometry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeomType {
    Triangle,
    Quad,
    Grid,
}

impl From<&str> for GeomType {
    /// Parses `"triangle"`/`"quad"`/`"grid"`; anything else falls back to
    /// [`GeomType::Grid`].
    fn from(s: &str) -> Self {
        match s {
            "triangle" => GeomType::Triangle,
            "quad" => GeomType::Quad,
            _ => GeomType::Grid,
        }
    }
}

/// Configuration for a correction engine instance.
///
/// `vert_grid`/`vert_grid_in` are not stored here: the façade borrows them
/// for the lifetime of each call (see [`crate::facade::TerrainCorrector`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Rows of the outer DEM.
    pub dem_rows: usize,
    /// Columns of the outer DEM.
    pub dem_cols: usize,
    /// Rows of the inner DEM.
    pub dem_rows_in: usize,
    /// Columns of the inner DEM.
    pub dem_cols_in: usize,
    /// Pixels per aggregation-grid cell, along each axis.
    pub pixel_per_gc: usize,
    /// Grid-cell offset of the inner DEM within the outer DEM.
    pub offset_gc: usize,
    /// Occlusion scene geometry mode.
    pub geom_type: GeomType,
    /// Shadow-ray search distance, kilometres.
    pub dist_search_km: f64,
    /// Per-triangle correction-factor clamp.
    pub sw_dir_cor_max: f32,
    /// Minimum solar elevation above the local horizontal, degrees, below
    /// which a triangle is considered below its own horizon.
    pub ang_max_deg: f64,
    /// Ray-origin offset along the tilted-triangle normal, metres.
    pub ray_org_elev: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            dem_rows: 0,
            dem_cols: 0,
            dem_rows_in: 0,
            dem_cols_in: 0,
            pixel_per_gc: 1,
            offset_gc: 0,
            geom_type: GeomType::Triangle,
            dist_search_km: 50.0,
            sw_dir_cor_max: 25.0,
            ang_max_deg: 89.0,
            ray_org_elev: 0.1,
        }
    }
}

impl TerrainConfig {
    /// `cos(ang_max_deg)`, the minimum allowed dot product between a
    /// triangle's horizontal normal and the sun vector.
    pub fn dot_prod_min(&self) -> f64 {
        self.ang_max_deg.to_radians().cos()
    }

    /// Validates the invariants from the outer/inner DEM relationship and
    /// the numerical bounds; used by [`crate::TerrainCorrector::initialise`].
    pub fn validate(&self) -> Result<(), crate::TerrainError> {
        use crate::TerrainError::InvalidConfig;

        if self.pixel_per_gc == 0 {
            return Err(InvalidConfig("pixel_per_gc must be >= 1".into()));
        }
        if self.sw_dir_cor_max <= 0.0 {
            return Err(InvalidConfig("sw_dir_cor_max must be > 0".into()));
        }
        if self.dist_search_km <= 0.0 {
            return Err(InvalidConfig("dist_search_km must be > 0".into()));
        }
        if !(0.0 < self.ang_max_deg && self.ang_max_deg <= 90.0) {
            return Err(InvalidConfig("ang_max_deg must be in (0, 90]".into()));
        }
        let shift = 2 * self.offset_gc * self.pixel_per_gc;
        let expect_rows_in = self.dem_rows.checked_sub(shift).ok_or_else(|| {
            InvalidConfig(format!(
                "outer DEM rows ({}) are too small for offset_gc={} and pixel_per_gc={} (need at least {})",
                self.dem_rows, self.offset_gc, self.pixel_per_gc, shift
            ))
        })?;
        let expect_cols_in = self.dem_cols.checked_sub(shift).ok_or_else(|| {
            InvalidConfig(format!(
                "outer DEM cols ({}) are too small for offset_gc={} and pixel_per_gc={} (need at least {})",
                self.dem_cols, self.offset_gc, self.pixel_per_gc, shift
            ))
        })?;
        if self.dem_rows_in != expect_rows_in || self.dem_cols_in != expect_cols_in {
            return Err(InvalidConfig(format!(
                "inner DEM dimensions ({}, {}) do not match outer DEM ({}, {}) with offset_gc={} and pixel_per_gc={} (expected ({}, {}))",
                self.dem_rows_in, self.dem_cols_in, self.dem_rows, self.dem_cols,
                self.offset_gc, self.pixel_per_gc, expect_rows_in, expect_cols_in
            )));
        }
        Ok(())
    }

    /// Number of aggregation cells along (y, x).
    pub fn num_gc(&self) -> (usize, usize) {
        (
            (self.dem_rows_in - 1) / self.pixel_per_gc,
            (self.dem_cols_in - 1) / self.pixel_per_gc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geom_type_falls_back_to_grid() {
        assert_eq!(GeomType::from("triangle"), GeomType::Triangle);
        assert_eq!(GeomType::from("quad"), GeomType::Quad);
        assert_eq!(GeomType::from("grid"), GeomType::Grid);
        assert_eq!(GeomType::from("bogus"), GeomType::Grid);
    }

    #[test]
    fn dot_prod_min_matches_angle() {
        let mut cfg = TerrainConfig::default();
        cfg.ang_max_deg = 0.0001;
        assert!(cfg.dot_prod_min() > 0.999);
    }

    #[test]
    fn validate_rejects_mismatched_inner_dem() {
        let cfg = TerrainConfig {
            dem_rows: 100,
            dem_cols: 100,
            dem_rows_in: 50,
            dem_cols_in: 50,
            pixel_per_gc: 2,
            offset_gc: 1,
            ..TerrainConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_consistent_dims() {
        let cfg = TerrainConfig {
            dem_rows: 104,
            dem_cols: 104,
            dem_rows_in: 100,
            dem_cols_in: 100,
            pixel_per_gc: 2,
            offset_gc: 1,
            ..TerrainConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_offset_larger_than_outer_dem_without_panicking() {
        let cfg = TerrainConfig {
            dem_rows: 10,
            dem_cols: 10,
            dem_rows_in: 10,
            dem_cols_in: 10,
            pixel_per_gc: 4,
            offset_gc: 3, // 2*3*4 = 24 > dem_rows
            ..TerrainConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
