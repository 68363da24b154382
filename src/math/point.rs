use std::ops::{Add, Sub};

use glam::{Vec2, Vec3};

use super::float::EPSILON;

/// 2D cartesian point. Distinct from [`Vec2`]: points locate, vectors
/// displace, and only the difference of two points is a vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2(pub Vec2);

impl Point2 {
    pub const ORIGIN: Point2 = Point2(Vec2::ZERO);

    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn vec(self) -> Vec2 {
        self.0
    }

    pub fn x(self) -> f32 {
        self.0.x
    }

    pub fn y(self) -> f32 {
        self.0.y
    }

    /// Weighted combination `a0 * self + a1 * p1`. The weights are expected
    /// to sum to 1 but this is not enforced.
    pub fn affine_combination(self, a0: f32, a1: f32, p1: Point2) -> Point2 {
        Point2(self.0 * a0 + p1.0 * a1)
    }

    pub fn midpoint(self, p1: Point2) -> Point2 {
        self.affine_combination(0.5, 0.5, p1)
    }

    /// Equality within [`EPSILON`]. Use this, not `==`, for geometric
    /// decisions; bit-exact comparison of computed points is unreliable.
    pub fn approx_eq(self, other: Point2) -> bool {
        self.0.distance_squared(other.0) <= EPSILON * EPSILON
    }

    /// Point-in-polygon crossing test: shoots a ray along +x and counts edge
    /// crossings, discarding edges entirely above or below the ray.
    pub fn in_polygon(self, polygon: &[Point2]) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let (x, y) = (self.0.x, self.0.y);
        let mut inside = false;
        let mut p1 = polygon[polygon.len() - 1];
        let mut above1 = p1.0.y >= y;
        for &p2 in polygon {
            let above2 = p2.0.y >= y;
            if above1 != above2 {
                let lhs = (p2.0.y - y) * (p1.0.x - p2.0.x);
                let rhs = (p2.0.x - x) * (p1.0.y - p2.0.y);
                if (lhs >= rhs) == above2 {
                    inside = !inside;
                }
            }
            above1 = above2;
            p1 = p2;
        }
        inside
    }
}

impl Add<Vec2> for Point2 {
    type Output = Point2;

    fn add(self, rhs: Vec2) -> Point2 {
        Point2(self.0 + rhs)
    }
}

impl Sub<Vec2> for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Vec2) -> Point2 {
        Point2(self.0 - rhs)
    }
}

/// Two points can be subtracted but not added.
impl Sub for Point2 {
    type Output = Vec2;

    fn sub(self, rhs: Point2) -> Vec2 {
        self.0 - rhs.0
    }
}

/// 3D cartesian point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3(pub Vec3);

impl Point3 {
    pub const ORIGIN: Point3 = Point3(Vec3::ZERO);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn vec(self) -> Vec3 {
        self.0
    }

    pub fn x(self) -> f32 {
        self.0.x
    }

    pub fn y(self) -> f32 {
        self.0.y
    }

    pub fn z(self) -> f32 {
        self.0.z
    }

    /// Weighted combination `a0 * self + a1 * p1`. The weights are expected
    /// to sum to 1 but this is not enforced.
    pub fn affine_combination(self, a0: f32, a1: f32, p1: Point3) -> Point3 {
        Point3(self.0 * a0 + p1.0 * a1)
    }

    pub fn midpoint(self, p1: Point3) -> Point3 {
        self.affine_combination(0.5, 0.5, p1)
    }

    /// Equality within [`EPSILON`].
    pub fn approx_eq(self, other: Point3) -> bool {
        self.0.distance_squared(other.0) <= EPSILON * EPSILON
    }

    /// Test containment in a planar 3D polygon by projecting to the 2D axis
    /// plane that drops the normal's dominant component. Assumes the point
    /// already lies on the polygon's plane (normally it comes from a
    /// ray/plane intersection).
    pub fn in_polygon(self, polygon: &[Point3], normal: Vec3) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let n = normal.abs();
        if n.x >= n.y && n.x >= n.z {
            self.in_polygon_project(polygon, |p| Vec2::new(p.0.y, p.0.z))
        } else if n.y >= n.x && n.y >= n.z {
            self.in_polygon_project(polygon, |p| Vec2::new(p.0.x, p.0.z))
        } else {
            self.in_polygon_project(polygon, |p| Vec2::new(p.0.x, p.0.y))
        }
    }

    fn in_polygon_project(self, polygon: &[Point3], project: impl Fn(Point3) -> Vec2) -> bool {
        let p = Point2(project(self));
        // Small polygons only; the allocation is irrelevant next to the
        // ray/plane work that precedes this test.
        let projected: Vec<Point2> = polygon.iter().map(|&q| Point2(project(q))).collect();
        p.in_polygon(&projected)
    }
}

impl Add<Vec3> for Point3 {
    type Output = Point3;

    fn add(self, rhs: Vec3) -> Point3 {
        Point3(self.0 + rhs)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Vec3) -> Point3 {
        Point3(self.0 - rhs)
    }
}

/// Two points can be subtracted but not added.
impl Sub for Point3 {
    type Output = Vec3;

    fn sub(self, rhs: Point3) -> Vec3 {
        self.0 - rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_vector_algebra() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = p + Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(q, Point3::new(1.0, 3.0, 3.0));
        assert_eq!(q - p, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn affine_combination_on_line() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 4.0);
        let m = a.affine_combination(0.25, 0.75, b);
        assert!(m.approx_eq(Point2::new(7.5, 3.0)));
        assert!(a.midpoint(b).approx_eq(Point2::new(5.0, 2.0)));
    }

    #[test]
    fn square_containment() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(Point2::new(2.0, 2.0).in_polygon(&square));
        assert!(!Point2::new(5.0, 2.0).in_polygon(&square));
        assert!(!Point2::new(-1.0, -1.0).in_polygon(&square));
    }

    #[test]
    fn concave_containment() {
        // L-shaped polygon; the notch must be outside.
        let poly = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(Point2::new(1.0, 3.0).in_polygon(&poly));
        assert!(Point2::new(3.0, 1.0).in_polygon(&poly));
        assert!(!Point2::new(3.0, 3.0).in_polygon(&poly));
    }

    #[test]
    fn polygon_in_space() {
        // Square in the plane z = 1 with a +z normal: projection drops z.
        let square = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
            Point3::new(4.0, 4.0, 1.0),
            Point3::new(0.0, 4.0, 1.0),
        ];
        assert!(Point3::new(1.0, 1.0, 1.0).in_polygon(&square, Vec3::Z));
        assert!(!Point3::new(5.0, 1.0, 1.0).in_polygon(&square, Vec3::Z));

        // Square in the plane x = 0 with an +x-dominant normal: drops x.
        let wall = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 4.0),
            Point3::new(0.0, 0.0, 4.0),
        ];
        assert!(Point3::new(0.0, 2.0, 2.0).in_polygon(&wall, Vec3::X));
        assert!(!Point3::new(0.0, 2.0, 5.0).in_polygon(&wall, Vec3::X));
    }
}
