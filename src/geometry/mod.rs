//! Geometric primitives and predicates: planes, rays, bounding spheres and
//! line segments with the clipping/intersection algorithms built on them.
//!
//! Non-intersection is an ordinary outcome here, not an error: every query
//! that can miss returns an `Option`, and the same convention is used
//! crate-wide.

pub mod plane;
pub mod ray;
pub mod segment2;
pub mod segment3;
pub mod sphere;

pub use plane::{Plane, PlaneSide};
pub use ray::Ray3;
pub use segment2::{LineSegment2, Rect};
pub use segment3::LineSegment3;
pub use sphere::BoundingSphere;
