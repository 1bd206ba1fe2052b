// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The single-ray correction engine (C5): one occlusion query per surviving
//! triangle, with optional atmospheric refraction. The only engine that
//! supports refraction.

use rayon::prelude::*;

use super::common::{evaluate_triangle, TriangleSample};
use super::EngineStats;
use crate::config::TerrainConfig;
use crate::dem::DemView;
use crate::scene::Scene;
use crate::vector::DVector3;

/// Computes the correction factor for every masked cell, one shadow ray at
/// a time. `out`/`mask` are `num_gc_y * num_gc_x` row-major, matching
/// [`TerrainConfig::num_gc`].
pub fn run(
    scene: &Scene<'_>,
    outer: &DemView,
    inner: &DemView,
    cfg: &TerrainConfig,
    sun_pos: DVector3,
    mask: &[u8],
    out: &mut [f32],
    refrac_cor: bool,
) -> EngineStats {
    let (num_gc_y, num_gc_x) = cfg.num_gc();
    assert_eq!(mask.len(), num_gc_y * num_gc_x);
    assert_eq!(out.len(), num_gc_y * num_gc_x);

    let tris_per_cell = (cfg.pixel_per_gc * cfg.pixel_per_gc * 2) as f32;

    out.par_chunks_mut(num_gc_x)
        .zip(mask.par_chunks(num_gc_x))
        .enumerate()
        .map(|(gi, (out_row, mask_row))| {
            let mut row_stats = EngineStats::default();
            for gj in 0..num_gc_x {
                if mask_row[gj] != 1 {
                    out_row[gj] = f32::NAN;
                    continue;
                }
                let mut acc = 0.0f32;
                for pi in 0..cfg.pixel_per_gc {
                    for pj in 0..cfg.pixel_per_gc {
                        let i = gi * cfg.pixel_per_gc + pi;
                        let j = gj * cfg.pixel_per_gc + pj;
                        for n in 0..2 {
                            row_stats.triangles_considered += 1;
                            match evaluate_triangle(
                                outer, inner, cfg, sun_pos, i, j, n, refrac_cor,
                            ) {
                                TriangleSample::SelfShadowed => {}
                                TriangleSample::Candidate { ray, contribution } => {
                                    row_stats.rays_traced += 1;
                                    if !scene.occluded(&ray) {
                                        acc += contribution;
                                    }
                                }
                            }
                        }
                    }
                }
                out_row[gj] = acc / tris_per_cell;
            }
            row_stats
        })
        .reduce(EngineStats::default, |a, b| a + b)
}
