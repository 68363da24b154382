use glam::Vec3;

use crate::math::{EPSILON, Point3, Vec3Ext};

/// Which side of a plane a point falls on, at [`EPSILON`] tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

/// Plane in coefficient form: the set of points where
/// `a*x + b*y + c*z + d == 0`. The normal (a, b, c) is not unit length
/// unless [`Plane::normalize`] has been called, so [`Plane::solve`] returns
/// a signed *scaled* distance in general.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    /// Plane through three points with counter-clockwise winding giving the
    /// outward normal. Returns `None` for a degenerate (near zero area)
    /// triangle.
    pub fn from_points(p1: Point3, p2: Point3, p3: Point3) -> Option<Plane> {
        let n = (p2 - p1).cross(p3 - p1);
        if n.length_squared() <= EPSILON * EPSILON {
            return None;
        }
        Some(Self::from_point_normal(p1, n))
    }

    /// Plane through `p` with normal `n` (not required to be unit length).
    pub fn from_point_normal(p: Point3, n: Vec3) -> Plane {
        Plane {
            a: n.x,
            b: n.y,
            c: n.z,
            d: -n.dot(p.vec()),
        }
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Evaluate the plane equation at `p`: a signed distance when the plane
    /// is normalized, and a consistently scaled value otherwise. Positive
    /// means in front (normal side).
    pub fn solve(&self, p: Point3) -> f32 {
        self.a * p.x() + self.b * p.y() + self.c * p.z() + self.d
    }

    /// Scale the coefficients so (a, b, c) is unit length. A degenerate
    /// normal is left unchanged.
    pub fn normalize(&mut self) {
        let len = self.normal().length();
        if len > EPSILON {
            let inv = 1.0 / len;
            self.a *= inv;
            self.b *= inv;
            self.c *= inv;
            self.d *= inv;
        }
    }

    /// Classify `p` against the plane at [`EPSILON`] tolerance.
    pub fn side(&self, p: Point3) -> PlaneSide {
        let s = self.solve(p);
        if s > EPSILON {
            PlaneSide::Front
        } else if s < -EPSILON {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// Reflect a direction about the plane's (normalized) normal.
    pub fn reflect(&self, v: Vec3) -> Vec3 {
        v.reflect(self.normal().normalize_or_keep())
    }
}
