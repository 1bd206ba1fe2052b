// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Atmospheric refraction (Saemundsson model) and its application to a
//! triangle's incoming sun vector, used only by the single-ray engine
//! ([`crate::engine::single`]).

use crate::vector::{cross, rotate, unit, DVector3};

const T_REF_K: f64 = 283.15;
const P_REF_KPA: f64 = 101.0;
const LAPSE_RATE: f64 = 0.0065; // K/m
const GRAVITY: f64 = 9.81; // m/s^2
const R_DRY_AIR: f64 = 287.0; // J/(kg K)

/// Saemundsson's refraction correction, in degrees of elevation, for an
/// apparent elevation `elev_deg`, ambient temperature `temp_c` and pressure
/// `p_kpa`.
pub fn atmos_refrac(elev_deg: f64, temp_c: f64, p_kpa: f64) -> f64 {
    let elev_deg = elev_deg.clamp(-1.0, 90.0);
    let mut r = 1.02 / (elev_deg + 10.3 / (elev_deg + 5.11)).to_radians().tan();
    r += 0.0019279; // so that r(90 deg) == 0
    r *= (p_kpa / 101.0) * (283.0 / (273.0 + temp_c));
    r / 60.0 // arc-minutes -> degrees
}

/// Barometric pressure in kPa at `elev_m` metres above the reference level,
/// under the standard-atmosphere lapse rate.
fn pressure_at(elev_m: f64) -> (f64, f64) {
    let exponent = GRAVITY / (R_DRY_AIR * LAPSE_RATE);
    let t = T_REF_K - LAPSE_RATE * elev_m;
    let p = P_REF_KPA * (t / T_REF_K).powf(exponent);
    (t, p)
}

/// Bends the unit sun vector `sun_dir` for atmospheric refraction, given the
/// triangle's horizontal normal `n_h` and the elevation difference
/// `elev_m = ||outer_centroid - inner_centroid||` between the outer and
/// inner DEMs at this triangle.
///
/// Returns the refracted (still unit) sun vector. If `sun_dir` is (numerically)
/// parallel to `n_h`, refraction cannot be defined (the rotation axis would be
/// the zero vector) and `sun_dir` is returned unchanged.
pub fn apply_refraction(sun_dir: DVector3, n_h: DVector3, elev_m: f64) -> DVector3 {
    let axis_unnorm = cross(sun_dir, n_h);
    let axis_norm = axis_unnorm.norm();
    if axis_norm < 1e-12 {
        return sun_dir;
    }
    let axis = axis_unnorm / axis_norm;

    let (t_k, p_kpa) = pressure_at(elev_m);
    let true_elev_deg = 90.0 - n_h.dot(&sun_dir).acos().to_degrees();
    let delta_deg = atmos_refrac(true_elev_deg, t_k - 273.15, p_kpa);

    unit(rotate(axis, delta_deg.to_radians(), sun_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn refraction_vanishes_at_zenith() {
        // reference conditions, straight overhead: correction should be ~0
        let r = atmos_refrac(90.0, 10.0, 101.0);
        assert!(r.abs() < 1e-6, "got {r}");
    }

    #[test]
    fn refraction_grows_near_horizon() {
        let near_horizon = atmos_refrac(1.0, 10.0, 101.0);
        let high = atmos_refrac(45.0, 10.0, 101.0);
        assert!(near_horizon > high);
    }

    #[test]
    fn parallel_sun_and_normal_is_a_no_op() {
        let n_h = unit(vector![0.0, 0.0, 1.0]);
        let sun = n_h;
        let refr = apply_refraction(sun, n_h, 0.0);
        assert_eq!(refr, sun);
    }

    #[test]
    fn refraction_keeps_sun_vector_unit() {
        let n_h = unit(vector![0.0, 0.0, 1.0]);
        let sun = unit(vector![1.0, 0.0, 0.2]);
        let refr = apply_refraction(sun, n_h, 150.0);
        assert!((refr.norm() - 1.0).abs() < 1e-9);
    }
}
