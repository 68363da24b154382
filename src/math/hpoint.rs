use glam::{Vec3, Vec4};

use super::float::EPSILON;
use super::point::{Point2, Point3};

/// 2D homogeneous point (x, y, w).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HPoint2 {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

impl HPoint2 {
    pub fn new(x: f32, y: f32, w: f32) -> Self {
        Self { x, y, w }
    }

    pub fn from_point(p: Point2) -> Self {
        Self::new(p.x(), p.y(), 1.0)
    }

    /// Divide through by w. A w of exactly 1 skips the division and a
    /// near-zero w is treated as 1, so a point at infinity degrades to its
    /// direction components instead of blowing up.
    pub fn to_cartesian(self) -> Point2 {
        if self.w == 1.0 {
            return Point2::new(self.x, self.y);
        }
        let d = if self.w.abs() > EPSILON { 1.0 / self.w } else { 1.0 };
        Point2::new(self.x * d, self.y * d)
    }
}

/// 3D homogeneous point (x, y, z, w). `w == 0` encodes a direction / point
/// at infinity, which is how directional lights are represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HPoint3(pub Vec4);

impl HPoint3 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self(Vec4::new(x, y, z, w))
    }

    pub fn from_point(p: Point3) -> Self {
        Self(p.vec().extend(1.0))
    }

    /// A point at infinity in the direction `v`.
    pub fn direction(v: Vec3) -> Self {
        Self(v.extend(0.0))
    }

    pub fn vec4(self) -> Vec4 {
        self.0
    }

    pub fn xyz(self) -> Vec3 {
        self.0.truncate()
    }

    pub fn w(self) -> f32 {
        self.0.w
    }

    pub fn is_directional(self) -> bool {
        self.0.w == 0.0
    }

    /// Divide through by w; see [`HPoint2::to_cartesian`] for the w
    /// conventions.
    pub fn to_cartesian(self) -> Point3 {
        if self.0.w == 1.0 {
            return Point3(self.xyz());
        }
        let d = if self.0.w.abs() > EPSILON {
            1.0 / self.0.w
        } else {
            1.0
        };
        Point3(self.xyz() * d)
    }
}

impl From<Point3> for HPoint3 {
    fn from(p: Point3) -> Self {
        Self::from_point(p)
    }
}

impl From<Point2> for HPoint2 {
    fn from(p: Point2) -> Self {
        Self::from_point(p)
    }
}
