pub use glam::{Vec2, Vec3, Vec4};

use crate::utils::warn_once;

use super::float::EPSILON;

pub trait Vec3Ext {
    /// Reflect about `normal` (assumed unit length).
    fn reflect(self, normal: Vec3) -> Vec3;

    /// Component of `self` along `other`.
    fn project_onto_vec(self, other: Vec3) -> Vec3;

    /// Normalize, leaving a near-zero vector unchanged instead of producing
    /// NaN components.
    fn normalize_or_keep(self) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - (2.0 * self.dot(normal) * normal)
    }

    fn project_onto_vec(self, other: Vec3) -> Vec3 {
        let d = other.length_squared();
        if d <= EPSILON * EPSILON {
            return Vec3::ZERO;
        }
        other * (self.dot(other) / d)
    }

    fn normalize_or_keep(self) -> Vec3 {
        match self.try_normalize() {
            Some(v) => v,
            None => {
                warn_once!("normalizing a near-zero Vec3, leaving it unchanged");
                self
            }
        }
    }
}

pub trait Vec2Ext {
    /// Perpendicular vector, 90 degrees counter-clockwise.
    fn perp_ccw(self) -> Vec2;

    /// Perpendicular vector, 90 degrees clockwise.
    fn perp_cw(self) -> Vec2;

    /// Component of `self` along `other`.
    fn project_onto_vec(self, other: Vec2) -> Vec2;

    fn normalize_or_keep(self) -> Vec2;
}

impl Vec2Ext for Vec2 {
    fn perp_ccw(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    fn perp_cw(self) -> Vec2 {
        Vec2::new(self.y, -self.x)
    }

    fn project_onto_vec(self, other: Vec2) -> Vec2 {
        let d = other.length_squared();
        if d <= EPSILON * EPSILON {
            return Vec2::ZERO;
        }
        other * (self.dot(other) / d)
    }

    fn normalize_or_keep(self) -> Vec2 {
        match self.try_normalize() {
            Some(v) => v,
            None => {
                warn_once!("normalizing a near-zero Vec2, leaving it unchanged");
                self
            }
        }
    }
}
