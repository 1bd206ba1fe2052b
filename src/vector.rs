// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Vector and triangle primitives.
//!
//! Geometry that feeds the occlusion scene (`scene`) is carried in `f32`,
//! matching [`crate::scene::Point3`]/[`crate::scene::Vector3`]. Everything
//! upstream of that boundary — the per-triangle correction math in
//! `engine` — works in `f64` via [`DPoint3`]/[`DVector3`], only narrowing at
//! the last moment.

/// Double-precision point, ENU metres.
pub type DPoint3 = nalgebra::Point3<f64>;
/// Double-precision direction/displacement vector, ENU metres.
pub type DVector3 = nalgebra::Vector3<f64>;

/// Normalises `v`. `v` must not be the zero vector — callers own well-formed
/// geometry, this is not defended against in release builds.
pub fn unit(v: DVector3) -> DVector3 {
    debug_assert!(v.norm() > 0.0, "unit() called on the zero vector");
    v / v.norm()
}

/// Right-handed cross product.
pub fn cross(a: DVector3, b: DVector3) -> DVector3 {
    a.cross(&b)
}

/// Rotates `v` around the unit axis `k` by `theta` radians (Rodrigues' formula).
pub fn rotate(k: DVector3, theta: f64, v: DVector3) -> DVector3 {
    let (sin_t, cos_t) = theta.sin_cos();
    v * cos_t + cross(k, v) * sin_t + k * k.dot(&v) * (1.0 - cos_t)
}

/// Normal (unit, right-handed from `v0,v1,v2` winding) and area of a triangle.
///
/// For the lower-left/upper-right split used by [`crate::indexer`] over a
/// flat DEM, this convention yields an upward-pointing (+z) normal.
pub fn triangle_normal_area(v0: DPoint3, v1: DPoint3, v2: DPoint3) -> (DVector3, f64) {
    let cr = cross(v2 - v1, v0 - v1);
    let mag = cr.norm();
    (cr / mag, mag / 2.0)
}

/// Arithmetic-mean centroid of a triangle.
pub fn triangle_centroid(v0: DPoint3, v1: DPoint3, v2: DPoint3) -> DPoint3 {
    DPoint3::from((v0.coords + v1.coords + v2.coords) / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{point, vector};

    #[test]
    fn unit_normalises() {
        let v = vector![3.0, 4.0, 0.0];
        let u = unit(v);
        assert!((u.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_is_right_handed() {
        let x = vector![1.0, 0.0, 0.0];
        let y = vector![0.0, 1.0, 0.0];
        assert_eq!(cross(x, y), vector![0.0, 0.0, 1.0]);
    }

    #[test]
    fn rotate_by_zero_is_identity() {
        let v = vector![1.0, 2.0, 3.0];
        let k = unit(vector![0.0, 0.0, 1.0]);
        let r = rotate(k, 0.0, v);
        assert!((r - v).norm() < 1e-12);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let v = vector![1.0, 0.0, 0.0];
        let k = vector![0.0, 0.0, 1.0];
        let r = rotate(k, std::f64::consts::FRAC_PI_2, v);
        assert!((r - vector![0.0, 1.0, 0.0]).norm() < 1e-9);
    }

    #[test]
    fn flat_dem_triangle_normal_points_up() {
        // lower-left split of a unit pixel in the xy plane
        let v0 = point![0.0, 0.0, 0.0];
        let v1 = point![1.0, 0.0, 0.0];
        let v2 = point![0.0, 1.0, 0.0];
        let (n, area) = triangle_normal_area(v0, v1, v2);
        assert!(n.z > 0.0, "expected an upward-pointing normal, got {:?}", n);
        assert!((area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn centroid_is_arithmetic_mean() {
        let v0 = point![0.0, 0.0, 0.0];
        let v1 = point![3.0, 0.0, 0.0];
        let v2 = point![0.0, 3.0, 0.0];
        let c = triangle_centroid(v0, v1, v2);
        assert!((c - point![1.0, 1.0, 0.0]).coords.norm() < 1e-12);
    }
}
