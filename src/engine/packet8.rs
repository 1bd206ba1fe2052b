// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The packet-8 correction engine (C7): rays are gathered from 2x2 pixel
//! blocks (2 triangles per pixel, 8 per block) and submitted as a single
//! fixed-width ray packet with a per-lane validity mask. Requires an even
//! `pixel_per_gc`. Refraction is not supported here (see `engine::single`).

use rayon::prelude::*;

use super::common::{evaluate_triangle, TriangleSample};
use super::EngineStats;
use crate::config::TerrainConfig;
use crate::dem::DemView;
use crate::error::TerrainError;
use crate::scene::{Ray, Scene};
use crate::vector::DVector3;

pub fn run(
    scene: &Scene<'_>,
    outer: &DemView,
    inner: &DemView,
    cfg: &TerrainConfig,
    sun_pos: DVector3,
    mask: &[u8],
    out: &mut [f32],
) -> Result<EngineStats, TerrainError> {
    if cfg.pixel_per_gc % 2 != 0 {
        log::error!(
            "packet-8 engine requires an even pixel_per_gc, got {}",
            cfg.pixel_per_gc
        );
        return Err(TerrainError::InvalidConfig(
            "pixel_per_gc must be even for the packet-8 engine".into(),
        ));
    }

    let (num_gc_y, num_gc_x) = cfg.num_gc();
    assert_eq!(mask.len(), num_gc_y * num_gc_x);
    assert_eq!(out.len(), num_gc_y * num_gc_x);

    let tris_per_cell = cfg.pixel_per_gc * cfg.pixel_per_gc * 2;

    let stats = out
        .par_chunks_mut(num_gc_x)
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

                // 2x2 pixel blocks -> 8 triangles per packet
                for bi in (0..cfg.pixel_per_gc).step_by(2) {
                    for bj in (0..cfg.pixel_per_gc).step_by(2) {
                        let mut packet_mask = [false; 8];
                        let mut packet_rays = [Ray::new(
                            crate::scene::Point3::origin(),
                            crate::scene::Vector3::z(),
                        ); 8];
                        let mut packet_contrib = [0.0f32; 8];

                        let mut lane = 0;
                        for di in 0..2 {
                            for dj in 0..2 {
                                let i = gi * cfg.pixel_per_gc + bi + di;
                                let j = gj * cfg.pixel_per_gc + bj + dj;
                                for n in 0..2 {
                                    row_stats.triangles_considered += 1;
                                    if let TriangleSample::Candidate { ray, contribution } =
                                        evaluate_triangle(
                                            outer, inner, cfg, sun_pos, i, j, n, false,
                                        )
                                    {
                                        packet_mask[lane] = true;
                                        packet_rays[lane] = ray;
                                        packet_contrib[lane] = contribution;
                                        row_stats.rays_traced += 1;
                                    }
                                    lane += 1;
                                }
                            }
                        }

                        let hits = scene.occluded_packet8(packet_mask, packet_rays);
                        for lane in 0..8 {
                            if packet_mask[lane] && !hits[lane] {
                                acc += packet_contrib[lane];
                            }
                        }
                    }
                }

                out_row[gj] = acc / tris_per_cell as f32;
            }
            row_stats
        })
        .reduce(EngineStats::default, |a, b| a + b);

    Ok(stats)
}
