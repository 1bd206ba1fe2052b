// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The per-triangle evaluation shared by the three correction engines
//! (single, coherent, packet-8): geometry, self-shadow tests and the
//! enlargement-factor contribution are computed once here; each engine only
//! differs in how it submits the resulting shadow ray(s) to the scene.

use crate::config::TerrainConfig;
use crate::dem::DemView;
use crate::refraction;
use crate::scene::{Point3, Ray, Vector3};
use crate::vector::{triangle_centroid, triangle_normal_area, unit, DVector3};

/// The outcome of evaluating one pixel sub-triangle.
pub enum TriangleSample {
    /// Below the triangle's own horizon, or facing away from the sun:
    /// contributes zero without needing a shadow ray.
    SelfShadowed,
    /// Passed both self-shadow tests; `ray` must be traced for occlusion,
    /// `contribution` is what to add if it comes back unoccluded.
    Candidate { ray: Ray, contribution: f32 },
}

/// Evaluates sub-triangle `n` of pixel `(i, j)`, shifted by the outer/inner
/// DEM offset in `cfg`. `apply_refraction` must only be set by the
/// single-ray engine (§4.2/§4.6 of the correction-engine design).
pub fn evaluate_triangle(
    outer: &DemView,
    inner: &DemView,
    cfg: &TerrainConfig,
    sun_pos: DVector3,
    i: usize,
    j: usize,
    n: usize,
    apply_refraction: bool,
) -> TriangleSample {
    let shift = cfg.offset_gc * cfg.pixel_per_gc;
    let [t0, t1, t2] = outer.triangle(i + shift, j + shift, n);
    let (n_t, area_t) = triangle_normal_area(t0, t1, t2);
    let centroid_t = triangle_centroid(t0, t1, t2);

    let [h0, h1, h2] = inner.triangle(i, j, n);
    let (n_h, area_h) = triangle_normal_area(h0, h1, h2);

    let origin = centroid_t + n_t * cfg.ray_org_elev;
    let mut sun_dir = unit(sun_pos - origin.coords);

    if apply_refraction {
        let centroid_h = triangle_centroid(h0, h1, h2);
        let elev_m = (centroid_t - centroid_h).norm();
        sun_dir = refraction::apply_refraction(sun_dir, n_h, elev_m);
    }

    let d_hs = n_h.dot(&sun_dir);
    if d_hs <= cfg.dot_prod_min() {
        return TriangleSample::SelfShadowed;
    }
    let d_ts = n_t.dot(&sun_dir);
    if d_ts <= 0.0 {
        return TriangleSample::SelfShadowed;
    }

    let enlargement = area_t / area_h;
    let contribution = ((d_ts / d_hs) * enlargement).min(cfg.sw_dir_cor_max as f64) as f32;

    let ray_origin = Point3::new(origin.x as f32, origin.y as f32, origin.z as f32);
    let ray_dir = Vector3::new(sun_dir.x as f32, sun_dir.y as f32, sun_dir.z as f32);
    let ray = Ray::new(ray_origin, ray_dir).with_tfar((cfg.dist_search_km * 1000.0) as f32);

    TriangleSample::Candidate { ray, contribution }
}
