// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Borrowed views over the outer and inner DEM vertex buffers.

use crate::vector::DPoint3;

/// A read-only view over a dense row-major grid of `f32` vertices
/// (x, y, z triplets, ENU metres), shaped `(rows, cols)`.
#[derive(Debug, Clone, Copy)]
pub struct DemView<'a> {
    vertices: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> DemView<'a> {
    /// Wraps `vertices` as a `(rows, cols)` vertex grid.
    ///
    /// `vertices.len()` must equal `rows * cols * 3`.
    pub fn new(vertices: &'a [f32], rows: usize, cols: usize) -> Self {
        assert_eq!(
            vertices.len(),
            rows * cols * 3,
            "DEM vertex buffer length does not match its declared (rows, cols)"
        );
        Self {
            vertices,
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn raw(&self) -> &'a [f32] {
        self.vertices
    }

    /// The `f64` vertex at `(row, col)`, narrowed up from the stored `f32`.
    pub fn vertex(&self, row: usize, col: usize) -> DPoint3 {
        let off = crate::indexer::vertex_offset(row, col, self.cols);
        DPoint3::new(
            self.vertices[off] as f64,
            self.vertices[off + 1] as f64,
            self.vertices[off + 2] as f64,
        )
    }

    /// The three `f64` vertices of sub-triangle `n` of pixel `(i, j)`.
    pub fn triangle(&self, i: usize, j: usize, n: usize) -> [DPoint3; 3] {
        let [(r0, c0), (r1, c1), (r2, c2)] = crate::indexer::tri_verts(i, j, n);
        [
            self.vertex(r0, c0),
            self.vertex(r1, c1),
            self.vertex(r2, c2),
        ]
    }
}
