use crate::math::Point3;

/// 3D line segment between endpoints `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineSegment3 {
    pub a: Point3,
    pub b: Point3,
}

impl LineSegment3 {
    pub fn new(a: Point3, b: Point3) -> Self {
        Self { a, b }
    }

    /// Distance from `p` to the segment and the closest point on it; the
    /// 3D analogue of [`LineSegment2::distance`].
    ///
    /// [`LineSegment2::distance`]: super::segment2::LineSegment2::distance
    pub fn distance(&self, p: Point3) -> (f32, Point3) {
        let v = self.b - self.a;
        let w = p - self.a;

        let n = w.dot(v);
        if n <= 0.0 {
            return (w.length(), self.a);
        }

        let d = v.dot(v);
        if d <= n {
            return ((p - self.b).length(), self.b);
        }

        let closest = self.a + v * (n / d);
        ((p - closest).length(), closest)
    }
}
