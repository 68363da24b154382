use bitflags::bitflags;
use glam::Vec2;

use crate::math::{EPSILON, Point2, Vec2Ext};

/// Axis-aligned clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

bitflags! {
    /// Cohen-Sutherland outcode: which rectangle boundaries a point
    /// violates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct OutCode: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const TOP = 1 << 3;
    }
}

impl OutCode {
    fn of(p: Point2, r: &Rect) -> OutCode {
        let mut code = OutCode::empty();
        if p.x() < r.left {
            code |= OutCode::LEFT;
        }
        if p.x() > r.right {
            code |= OutCode::RIGHT;
        }
        if p.y() < r.bottom {
            code |= OutCode::BOTTOM;
        }
        if p.y() > r.top {
            code |= OutCode::TOP;
        }
        code
    }
}

/// 2D line segment between endpoints `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineSegment2 {
    pub a: Point2,
    pub b: Point2,
}

impl LineSegment2 {
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    /// Distance from `p` to the segment and the closest point on it. The
    /// projection parameter is clamped to the endpoints; the division is
    /// deferred until we know the projection lands inside the segment.
    pub fn distance(&self, p: Point2) -> (f32, Point2) {
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

    /// Intersection point with another segment, if the segments cross with
    /// both parameters inside [0, 1]. Parallel segments (near-zero
    /// denominator) report no intersection; collinear overlapping segments
    /// are not detected and also report `None`.
    pub fn intersect(&self, other: &LineSegment2) -> Option<Point2> {
        let v = self.b - self.a;
        let w = other.b - other.a;

        let wp = w.perp_cw();
        let denom = wp.dot(v);
        if denom.abs() < EPSILON {
            return None;
        }

        let c = other.a - self.a;
        let t = wp.dot(c) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let vp = v.perp_cw();
        let u = vp.dot(c) / denom;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        Some(self.a + v * t)
    }

    /// Cyrus-Beck clip against a convex, counter-clockwise polygon.
    /// Maintains the candidate parameter interval [t_in, t_out], tightening
    /// it against each edge's half-plane; returns the surviving
    /// sub-segment, or `None` as soon as the interval empties.
    pub fn clip_to_polygon(&self, poly: &[Point2]) -> Option<LineSegment2> {
        // Fewer than three vertices has no interior to clip against.
        if poly.len() < 3 {
            return None;
        }

        let mut t_in = 0.0f32;
        let mut t_out = 1.0f32;

        let c = self.b - self.a;

        let mut p1 = poly[poly.len() - 1];
        for &p2 in poly {
            // Outward-facing edge normal for a CCW polygon.
            let n = Vec2::new(p2.y() - p1.y(), p1.x() - p2.x());

            let n_dot_c = n.dot(c);
            if n_dot_c.abs() < EPSILON {
                // Segment parallel to this edge; it constrains nothing.
                p1 = p2;
                continue;
            }

            let w = p1 - self.a;
            let t_hit = n.dot(w) / n_dot_c;

            if n_dot_c > 0.0 {
                // Exiting the polygon across this edge.
                t_out = t_out.min(t_hit);
            } else {
                t_in = t_in.max(t_hit);
            }

            if t_in > t_out {
                return None;
            }
            p1 = p2;
        }

        Some(LineSegment2::new(self.a + c * t_in, self.a + c * t_out))
    }

    /// Cohen-Sutherland clip against an axis-aligned rectangle. Trivially
    /// accepts when both outcodes are empty, trivially rejects when they
    /// share a violated boundary, and otherwise pulls one outside endpoint
    /// onto a violated boundary and re-tests.
    pub fn clip_to_rect(&self, r: &Rect) -> Option<LineSegment2> {
        let mut clip = *self;
        loop {
            let c1 = OutCode::of(clip.a, r);
            let c2 = OutCode::of(clip.b, r);

            if c1.is_empty() && c2.is_empty() {
                return Some(clip);
            }
            if !(c1 & c2).is_empty() {
                return None;
            }

            let (p, q) = if !c1.is_empty() {
                (&mut clip.a, clip.b)
            } else {
                (&mut clip.b, clip.a)
            };
            let code = OutCode::of(*p, r);

            if code.contains(OutCode::LEFT) {
                let y = p.y() + (r.left - p.x()) * (p.y() - q.y()) / (p.x() - q.x());
                *p = Point2::new(r.left, y);
            } else if code.contains(OutCode::RIGHT) {
                let y = p.y() + (r.right - p.x()) * (p.y() - q.y()) / (p.x() - q.x());
                *p = Point2::new(r.right, y);
            } else if code.contains(OutCode::BOTTOM) {
                let x = p.x() + (p.y() - r.bottom) * (q.x() - p.x()) / (p.y() - q.y());
                *p = Point2::new(x, r.bottom);
            } else if code.contains(OutCode::TOP) {
                let x = p.x() + (p.y() - r.top) * (q.x() - p.x()) / (p.y() - q.y());
                *p = Point2::new(x, r.top);
            }
        }
    }
}
