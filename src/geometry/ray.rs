use glam::Vec3;

use crate::math::{EPSILON, Point3, Vec3Ext};

use super::sphere::BoundingSphere;

/// Ray with a unit-length direction; the constructor normalizes, so the
/// parameter returned by the intersection queries is in world units.
#[derive(Debug, Clone, Copy)]
pub struct Ray3 {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray3 {
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_keep(),
        }
    }

    pub fn at(&self, t: f32) -> Point3 {
        self.origin + t * self.direction
    }

    /// Ray/sphere intersection. Returns the distance along the ray to the
    /// first surface hit: the nearer root when the origin is outside the
    /// sphere, the exit point when the origin is inside. `None` when the ray
    /// misses or the sphere lies behind the origin.
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> Option<f32> {
        let oc = self.origin - sphere.center;
        let b_half = oc.dot(self.direction);
        let c = oc.length_squared() - sphere.radius * sphere.radius;

        let discriminant_quarter = b_half * b_half - c;
        if discriminant_quarter < 0.0 {
            return None;
        }

        let root = discriminant_quarter.sqrt();
        let t_near = -b_half - root;
        if t_near > EPSILON {
            return Some(t_near);
        }
        let t_far = -b_half + root;
        if t_far > EPSILON {
            return Some(t_far);
        }
        None
    }
}
