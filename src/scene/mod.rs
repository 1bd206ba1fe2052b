// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The occlusion scene: builds a BVH-backed (or grid-marched) spatial index
//! over the outer DEM and answers shadow-ray occlusion queries for the
//! three correction engines.

pub mod aabb;
pub mod bvh;
pub mod grid;
pub mod ray;

use std::time::Instant;

pub use aabb::AABB;
pub use ray::Ray;

use crate::config::GeomType;
use crate::dem::DemView;
use crate::error::TerrainError;

/// Single-precision point, scene space.
pub type Point3 = nalgebra::Point3<f32>;
/// Single-precision vector, scene space.
pub type Vector3 = nalgebra::Vector3<f32>;

use aabb::{Bounded, Intersectable};
use bvh::BVH;

/// A single occluder triangle (used by [`GeomType::Triangle`] and, as a pair,
/// by [`GeomType::Quad`]).
#[derive(Clone, Copy)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
}

impl Bounded for Triangle {
    fn aabb(&self) -> AABB {
        AABB::default()
            .join(&AABB::new(self.v0, self.v0))
            .join(&AABB::new(self.v1, self.v1))
            .join(&AABB::new(self.v2, self.v2))
    }
}

impl Intersectable for Triangle {
    fn intersects(&self, ray: &Ray) -> Option<f32> {
        ray::intersects_triangle(ray, self.v0, self.v1, self.v2)
    }
}

enum Backend<'a> {
    /// Triangle and quad modes share this: a quad's two triangles are both
    /// inserted as BVH leaves (see [`GeomType::Quad`]'s documented
    /// equivalence to triangle mode in `DESIGN.md`).
    Bvh(BVH<Triangle>),
    /// A single DDA-marched primitive over the whole outer DEM, borrowing
    /// its vertex buffer rather than copying it.
    Grid(grid::GridPrimitive<'a>),
}

/// The built occlusion scene, opaque to callers beyond its three query
/// methods.
pub struct Scene<'a> {
    backend: Backend<'a>,
}

impl<'a> Scene<'a> {
    /// Builds a scene over `outer` in the given geometry mode. Grid mode
    /// borrows `outer`'s vertex buffer for `'a`; triangle/quad mode copies
    /// narrowed per-triangle vertices into BVH-owned leaves.
    pub fn build(outer: &DemView<'a>, geom_type: GeomType) -> Result<Self, TerrainError> {
        let rows = outer.rows();
        let cols = outer.cols();
        if rows < 2 || cols < 2 {
            return Err(TerrainError::SceneBuild(
                "outer DEM must have at least a 2x2 vertex grid".into(),
            ));
        }

        let start = Instant::now();
        let backend = match geom_type {
            GeomType::Triangle | GeomType::Quad => {
                let mut triangles = Vec::with_capacity((rows - 1) * (cols - 1) * 2);
                for i in 0..rows - 1 {
                    for j in 0..cols - 1 {
                        for n in 0..2 {
                            let [v0, v1, v2] = outer.triangle(i, j, n);
                            triangles.push(Triangle {
                                v0: narrow(v0),
                                v1: narrow(v1),
                                v2: narrow(v2),
                            });
                        }
                    }
                }
                let count = triangles.len();
                log::info!(
                    "built {:?} scene over {} triangles ({}x{} outer DEM)",
                    geom_type,
                    count,
                    rows,
                    cols
                );
                Backend::Bvh(BVH::build(triangles, 30))
            }
            GeomType::Grid => {
                let primitive = grid::GridPrimitive::new(outer);
                log::info!(
                    "built Grid scene over a single DDA primitive ({}x{} outer DEM)",
                    rows,
                    cols
                );
                Backend::Grid(primitive)
            }
        };
        log::info!("scene build took {:?}", start.elapsed());

        Ok(Self { backend })
    }

    /// Single-ray occlusion query (used by the single-ray engine).
    pub fn occluded(&self, ray: &Ray) -> bool {
        match &self.backend {
            Backend::Bvh(bvh) => bvh.occluded(ray),
            Backend::Grid(g) => g.occluded(ray),
        }
    }

    /// Coherent-batch occlusion query over `rays` (used by the coherent
    /// engine); semantically equivalent to mapping [`Scene::occluded`] but
    /// grouped at a single call site.
    pub fn occluded_batch(&self, rays: &[Ray]) -> Vec<bool> {
        rays.iter().map(|r| self.occluded(r)).collect()
    }

    /// Fixed-width 8-ray packet query, with `mask[i] == false` meaning lane
    /// `i` is inactive and must not be traced (used by the packet-8
    /// engine). Inactive lanes report `false` ("not occluded").
    pub fn occluded_packet8(&self, mask: [bool; 8], rays: [Ray; 8]) -> [bool; 8] {
        let mut out = [false; 8];
        for i in 0..8 {
            if mask[i] {
                out[i] = self.occluded(&rays[i]);
            }
        }
        out
    }
}

fn narrow(p: crate::vector::DPoint3) -> Point3 {
    Point3::new(p.x as f32, p.y as f32, p.z as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{point, vector};

    fn flat_dem(rows: usize, cols: usize) -> Vec<f32> {
        let mut v = Vec::with_capacity(rows * cols * 3);
        for r in 0..rows {
            for c in 0..cols {
                v.extend_from_slice(&[c as f32, r as f32, 0.0]);
            }
        }
        v
    }

    #[test]
    fn triangle_scene_occludes_a_downward_ray() {
        let grid = flat_dem(5, 5);
        let dem = DemView::new(&grid, 5, 5);
        let scene = Scene::build(&dem, GeomType::Triangle).unwrap();
        let ray = Ray::new(point![2.0, 2.0, 5.0], vector![0.0, 0.0, -1.0]);
        assert!(scene.occluded(&ray));
    }

    #[test]
    fn triangle_scene_does_not_occlude_ray_missing_the_dem() {
        let grid = flat_dem(5, 5);
        let dem = DemView::new(&grid, 5, 5);
        let scene = Scene::build(&dem, GeomType::Triangle).unwrap();
        let ray = Ray::new(point![500.0, 500.0, 5.0], vector![0.0, 0.0, -1.0]);
        assert!(!scene.occluded(&ray));
    }

    #[test]
    fn empty_outer_dem_fails_to_build() {
        let grid: Vec<f32> = vec![];
        let dem = DemView::new(&grid, 0, 0);
        assert!(Scene::build(&dem, GeomType::Triangle).is_err());
    }

    #[test]
    fn packet8_respects_the_lane_mask() {
        let grid = flat_dem(5, 5);
        let dem = DemView::new(&grid, 5, 5);
        let scene = Scene::build(&dem, GeomType::Triangle).unwrap();
        let hitting = Ray::new(point![2.0, 2.0, 5.0], vector![0.0, 0.0, -1.0]);
        let rays = [hitting; 8];
        let mut mask = [true; 8];
        mask[3] = false;
        let out = scene.occluded_packet8(mask, rays);
        assert!(!out[3]);
        assert!(out[0]);
    }
}
