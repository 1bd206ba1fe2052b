// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Axis-aligned bounding boxes over `f32` geometry, and the slab-test ray
//! intersection used by the BVH traversal.

use std::ops::Deref;

use super::{Point3, Ray};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3,
    pub max: Point3,
}

impl AABB {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn join(&self, other: &AABB) -> AABB {
        AABB::new(
            Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }
}

impl Default for AABB {
    fn default() -> Self {
        AABB::new(
            Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        )
    }
}

/// Anything with a bounding box.
pub trait Bounded {
    fn aabb(&self) -> AABB;
}

impl<T: Bounded, U: Deref<Target = [T]>> Bounded for U {
    fn aabb(&self) -> AABB {
        self.iter()
            .fold(AABB::default(), |acc, elem| acc.join(&elem.aabb()))
    }
}

/// Anything a ray can be tested against, returning the hit distance along
/// the ray (if any).
pub trait Intersectable {
    fn intersects(&self, ray: &Ray) -> Option<f32>;
}

impl Intersectable for AABB {
    /// Cyrus-Beck / slab-method ray-box intersection.
    fn intersects(&self, ray: &Ray) -> Option<f32> {
        let mut tmin = 0.0f32;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.dir[axis];
            let min = self.min[axis];
            let max = self.max[axis];

            if dir.abs() < f32::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
            } else {
                let inv_d = 1.0 / dir;
                let mut t1 = (min - origin) * inv_d;
                let mut t2 = (max - origin) * inv_d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                tmin = tmin.max(t1);
                tmax = tmax.min(t2);
                if tmin > tmax {
                    return None;
                }
            }
        }
        Some(tmin)
    }
}
