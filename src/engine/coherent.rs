// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The coherent-batch correction engine (C6): identical per-triangle math to
//! the single-ray engine, but every cell's surviving rays are buffered and
//! submitted to the scene as one coherent group. Refraction is not
//! supported here (see `engine::single`).

use rayon::prelude::*;

use super::common::{evaluate_triangle, TriangleSample};
use super::EngineStats;
use crate::config::TerrainConfig;
use crate::dem::DemView;
use crate::scene::Scene;
use crate::vector::DVector3;

pub fn run(
    scene: &Scene<'_>,
    outer: &DemView,
    inner: &DemView,
    cfg: &TerrainConfig,
    sun_pos: DVector3,
    mask: &[u8],
    out: &mut [f32],
) -> EngineStats {
    let (num_gc_y, num_gc_x) = cfg.num_gc();
    assert_eq!(mask.len(), num_gc_y * num_gc_x);
    assert_eq!(out.len(), num_gc_y * num_gc_x);

    let tris_per_cell = cfg.pixel_per_gc * cfg.pixel_per_gc * 2;

    out.par_chunks_mut(num_gc_x)
        .zip(mask.par_chunks(num_gc_x))
        .enumerate()
        .map(|(gi, (out_row, mask_row))| {
            let mut row_stats = EngineStats::default();
            // reused per cell, capacity sized to the worst case
            let mut rays = Vec::with_capacity(tris_per_cell);
            let mut contributions = Vec::with_capacity(tris_per_cell);

            for gj in 0..num_gc_x {
                if mask_row[gj] != 1 {
                    out_row[gj] = f32::NAN;
                    continue;
                }
                rays.clear();
                contributions.clear();

                for pi in 0..cfg.pixel_per_gc {
                    for pj in 0..cfg.pixel_per_gc {
                        let i = gi * cfg.pixel_per_gc + pi;
                        let j = gj * cfg.pixel_per_gc + pj;
                        for n in 0..2 {
                            row_stats.triangles_considered += 1;
                            if let TriangleSample::Candidate { ray, contribution } =
                                evaluate_triangle(outer, inner, cfg, sun_pos, i, j, n, false)
                            {
                                rays.push(ray);
                                contributions.push(contribution);
                            }
                        }
                    }
                }

                row_stats.rays_traced += rays.len();
                let occluded = scene.occluded_batch(&rays);
                let acc: f32 = occluded
                    .iter()
                    .zip(contributions.iter())
                    .filter(|(hit, _)| !**hit)
                    .map(|(_, c)| *c)
                    .sum();

                out_row[gj] = acc / tris_per_cell as f32;
            }
            row_stats
        })
        .reduce(EngineStats::default, |a, b| a + b)
}
