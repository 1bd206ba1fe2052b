// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The `grid` geometry mode: a single primitive spanning the whole outer
//! DEM, traversed with a digital differential analyser (DDA) march over its
//! `(rows-1) x (cols-1)` cells instead of being partitioned into a BVH.

use super::ray::{intersects_triangle, Ray};
use crate::dem::DemView;
use crate::indexer;

/// A DDA-marched occluder spanning an entire outer DEM, borrowing its vertex
/// buffer for the scene's lifetime rather than copying it.
///
/// The march happens in *index space* (row/col units), not world space: a
/// DEM's vertices need not sit at integer ENU coordinates, so the origin and
/// per-axis spacing are read off the grid itself (`vertex(0,0)`,
/// `vertex(0,1)`, `vertex(1,0)`) and used to map the ray into index space
/// before stepping. This assumes an axis-aligned, uniformly spaced grid,
/// which is the DEM's documented shape (§3).
pub struct GridPrimitive<'a> {
    vertices: &'a [f32],
    rows: usize,
    cols: usize,
    origin_x: f32,
    origin_y: f32,
    spacing_x: f32,
    spacing_y: f32,
}

impl<'a> GridPrimitive<'a> {
    pub fn new(outer: &DemView<'a>) -> Self {
        let rows = outer.rows();
        let cols = outer.cols();
        let origin = outer.vertex(0, 0);
        let spacing_x = if cols > 1 {
            (outer.vertex(0, 1).x - origin.x) as f32
        } else {
            1.0
        };
        let spacing_y = if rows > 1 {
            (outer.vertex(1, 0).y - origin.y) as f32
        } else {
            1.0
        };
        Self {
            vertices: outer.raw(),
            rows,
            cols,
            origin_x: origin.x as f32,
            origin_y: origin.y as f32,
            spacing_x,
            spacing_y,
        }
    }

    fn vertex32(&self, row: usize, col: usize) -> super::Point3 {
        let off = indexer::vertex_offset(row, col, self.cols);
        super::Point3::new(
            self.vertices[off],
            self.vertices[off + 1],
            self.vertices[off + 2],
        )
    }

    fn cell_intersects(&self, i: usize, j: usize, ray: &Ray) -> Option<f32> {
        for n in 0..2 {
            let [(r0, c0), (r1, c1), (r2, c2)] = indexer::tri_verts(i, j, n);
            let v0 = self.vertex32(r0, c0);
            let v1 = self.vertex32(r1, c1);
            let v2 = self.vertex32(r2, c2);
            if let Some(t) = intersects_triangle(ray, v0, v1, v2) {
                return Some(t);
            }
        }
        None
    }

    /// Marches the DEM's `(rows-1) x (cols-1)` cell grid in the direction of
    /// the ray's xy projection, testing both triangles of every cell the
    /// ray's footprint crosses, and returns the closest hit within
    /// `[ray.tnear, ray.tfar]`.
    pub fn occluded(&self, ray: &Ray) -> bool {
        let n_cells_y = self.rows.saturating_sub(1);
        let n_cells_x = self.cols.saturating_sub(1);
        if n_cells_x == 0 || n_cells_y == 0 {
            return false;
        }

        // map world-space ray origin/direction into (col, row) index space
        // using the DEM's own origin and per-axis spacing, not raw world
        // coordinates: columns map to x, rows to y. `idx(t) = idx(0) + t *
        // dir`, with `t` still the ray's world-distance parameter, so the
        // resulting t_max/t_delta values stay comparable to `ray.tfar`.
        let start_x = (ray.origin.x - self.origin_x) / self.spacing_x;
        let start_y = (ray.origin.y - self.origin_y) / self.spacing_y;
        let dir_x = ray.dir.x / self.spacing_x;
        let dir_y = ray.dir.y / self.spacing_y;

        let mut cell_x = start_x.floor();
        let mut cell_y = start_y.floor();

        let step_x: f32 = if dir_x > 0.0 { 1.0 } else { -1.0 };
        let step_y: f32 = if dir_y > 0.0 { 1.0 } else { -1.0 };

        // purely vertical rays (dir_x == dir_y == 0) degenerate to a single
        // column test, which the loop below handles via an effectively
        // infinite t_max_x/t_max_y.
        let t_delta_x = if dir_x.abs() > f32::EPSILON {
            (1.0 / dir_x).abs()
        } else {
            f32::INFINITY
        };
        let t_delta_y = if dir_y.abs() > f32::EPSILON {
            (1.0 / dir_y).abs()
        } else {
            f32::INFINITY
        };

        let mut t_max_x = if dir_x.abs() > f32::EPSILON {
            (((cell_x + if dir_x > 0.0 { 1.0 } else { 0.0 }) - start_x) / dir_x).abs()
        } else {
            f32::INFINITY
        };
        let mut t_max_y = if dir_y.abs() > f32::EPSILON {
            (((cell_y + if dir_y > 0.0 { 1.0 } else { 0.0 }) - start_y) / dir_y).abs()
        } else {
            f32::INFINITY
        };

        let max_steps = n_cells_x + n_cells_y + 2;
        for _ in 0..=max_steps {
            if cell_x >= 0.0
                && cell_y >= 0.0
                && (cell_x as usize) < n_cells_x
                && (cell_y as usize) < n_cells_y
            {
                if self
                    .cell_intersects(cell_y as usize, cell_x as usize, ray)
                    .is_some()
                {
                    return true;
                }
            }

            if t_max_x < t_max_y {
                t_max_x += t_delta_x;
                cell_x += step_x;
            } else {
                t_max_y += t_delta_y;
                cell_y += step_y;
            }

            if t_max_x.min(t_max_y) > ray.tfar {
                break;
            }
        }
        false
    }
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
    fn grid_primitive_occludes_a_downward_ray_over_the_dem() {
        let grid = flat_dem(6, 6);
        let dem = DemView::new(&grid, 6, 6);
        let primitive = GridPrimitive::new(&dem);
        let ray = Ray::new(point![2.5, 2.5, 5.0], vector![0.0, 0.0, -1.0]);
        assert!(primitive.occluded(&ray));
    }

    #[test]
    fn grid_primitive_misses_outside_the_dem_footprint() {
        let grid = flat_dem(6, 6);
        let dem = DemView::new(&grid, 6, 6);
        let primitive = GridPrimitive::new(&dem);
        let ray = Ray::new(point![50.0, 50.0, 5.0], vector![0.0, 0.0, -1.0]);
        assert!(!primitive.occluded(&ray));
    }

    #[test]
    fn grid_primitive_marches_a_grazing_ray() {
        let grid = flat_dem(6, 6);
        let dem = DemView::new(&grid, 6, 6);
        let primitive = GridPrimitive::new(&dem);
        let ray = Ray::new(point![-1.0, 2.5, 0.2], vector![1.0, 0.0, 0.0]).with_tfar(10.0);
        assert!(primitive.occluded(&ray));
    }

    /// A real ENU DEM, with metre spacing and a non-zero origin: the march
    /// must index off the grid's own coordinates, not raw world units.
    fn spaced_dem(rows: usize, cols: usize, spacing: f32, origin: (f32, f32)) -> Vec<f32> {
        let mut v = Vec::with_capacity(rows * cols * 3);
        for r in 0..rows {
            for c in 0..cols {
                v.extend_from_slice(&[
                    origin.0 + c as f32 * spacing,
                    origin.1 + r as f32 * spacing,
                    0.0,
                ]);
            }
        }
        v
    }

    #[test]
    fn grid_primitive_marches_correctly_over_a_spaced_offset_dem() {
        let spacing = 5.0;
        let origin = (1000.0, 2000.0);
        let grid = spaced_dem(6, 6, spacing, origin);
        let dem = DemView::new(&grid, 6, 6);
        let primitive = GridPrimitive::new(&dem);

        // over the DEM's footprint in world space (not index space)
        let x = origin.0 + 2.5 * spacing;
        let y = origin.1 + 2.5 * spacing;
        let hitting = Ray::new(point![x, y, 5.0], vector![0.0, 0.0, -1.0]);
        assert!(primitive.occluded(&hitting));

        // just outside the footprint at the same relative offset that the
        // unit-spacing test above used as "outside"
        let missing = Ray::new(
            point![origin.0 + 50.0 * spacing, origin.1 + 50.0 * spacing, 5.0],
            vector![0.0, 0.0, -1.0],
        );
        assert!(!primitive.occluded(&missing));
    }
}
