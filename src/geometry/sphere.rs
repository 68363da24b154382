use crate::math::Point3;

/// Sphere used for bounding volumes and collision proxies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Point3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Point3) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }
}
