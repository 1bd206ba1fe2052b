// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The terrain-correction façade (C8): owns the built occlusion scene and
//! configuration, dispatches to the single/coherent/packet-8 engines.

use crate::config::TerrainConfig;
use crate::dem::DemView;
use crate::engine::{coherent, packet8, single};
use crate::error::TerrainError;
use crate::scene::Scene;
use crate::vector::DVector3;

/// Ray-traced shortwave direct-radiation correction over an outer/inner DEM
/// pair. Borrows both vertex buffers for its lifetime (`'a`); the scene is
/// built once in [`TerrainCorrector::initialise`] and reused across calls.
pub struct TerrainCorrector<'a> {
    outer: DemView<'a>,
    inner: DemView<'a>,
    cfg: TerrainConfig,
    scene: Scene<'a>,
}

impl<'a> TerrainCorrector<'a> {
    /// Validates `cfg`, builds the occlusion scene over `outer_vertices`,
    /// and wraps `inner_vertices` as the reference horizontal surface.
    pub fn initialise(
        cfg: TerrainConfig,
        outer_vertices: &'a [f32],
        inner_vertices: &'a [f32],
    ) -> Result<Self, TerrainError> {
        cfg.validate()?;

        let outer = DemView::new(outer_vertices, cfg.dem_rows, cfg.dem_cols);
        let inner = DemView::new(inner_vertices, cfg.dem_rows_in, cfg.dem_cols_in);
        let scene = Scene::build(&outer, cfg.geom_type)?;

        let (num_gc_y, num_gc_x) = cfg.num_gc();
        log::info!(
            "initialised terrain corrector: {}x{} outer DEM, {}x{} inner DEM, {}x{} aggregation grid, \
             pixel_per_gc={}, ang_max={:.2} deg, sw_dir_cor_max={:.2}, dist_search={:.1} km",
            cfg.dem_rows,
            cfg.dem_cols,
            cfg.dem_rows_in,
            cfg.dem_cols_in,
            num_gc_y,
            num_gc_x,
            cfg.pixel_per_gc,
            cfg.ang_max_deg,
            cfg.sw_dir_cor_max,
            cfg.dist_search_km,
        );

        Ok(Self {
            outer,
            inner,
            cfg,
            scene,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.cfg
    }

    /// `mask`/`out` are `num_gc_y * num_gc_x` row-major (see
    /// [`TerrainConfig::num_gc`]). Only this engine supports refraction.
    pub fn sw_dir_cor(&self, sun_pos: DVector3, mask: &[u8], out: &mut [f32], refrac_cor: bool) {
        let start = std::time::Instant::now();
        let stats = single::run(
            &self.scene,
            &self.outer,
            &self.inner,
            &self.cfg,
            sun_pos,
            mask,
            out,
            refrac_cor,
        );
        log::info!(
            "sw_dir_cor: {} rays traced / {} triangles considered ({:.1}% survived self-shadow) in {:?}",
            stats.rays_traced,
            stats.triangles_considered,
            stats.ray_ratio() * 100.0,
            start.elapsed()
        );
    }

    /// Coherent-batch engine: identical math to [`Self::sw_dir_cor`], but
    /// every cell's surviving rays are submitted to the scene as one group.
    /// Does not support refraction.
    pub fn sw_dir_cor_coherent(&self, sun_pos: DVector3, mask: &[u8], out: &mut [f32]) {
        let start = std::time::Instant::now();
        let stats = coherent::run(
            &self.scene,
            &self.outer,
            &self.inner,
            &self.cfg,
            sun_pos,
            mask,
            out,
        );
        log::info!(
            "sw_dir_cor_coherent: {} rays traced / {} triangles considered ({:.1}% survived self-shadow) in {:?}",
            stats.rays_traced,
            stats.triangles_considered,
            stats.ray_ratio() * 100.0,
            start.elapsed()
        );
    }

    /// Packet-8 engine: rays are gathered from 2x2 pixel blocks and
    /// submitted as one 8-wide packet. Requires `pixel_per_gc` to be even
    /// and does not support refraction.
    pub fn sw_dir_cor_coherent_rp8(
        &self,
        sun_pos: DVector3,
        mask: &[u8],
        out: &mut [f32],
    ) -> Result<(), TerrainError> {
        let start = std::time::Instant::now();
        let stats = packet8::run(
            &self.scene,
            &self.outer,
            &self.inner,
            &self.cfg,
            sun_pos,
            mask,
            out,
        )?;
        log::info!(
            "sw_dir_cor_coherent_rp8: {} rays traced / {} triangles considered ({:.1}% survived self-shadow) in {:?}",
            stats.rays_traced,
            stats.triangles_considered,
            stats.ray_ratio() * 100.0,
            start.elapsed()
        );
        Ok(())
    }
}
