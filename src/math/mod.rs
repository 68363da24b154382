//! Linear algebra primitives: points, homogeneous points, vectors and the
//! 4x4 transform matrix. Vector storage comes from [`glam`]; the types here
//! add the point/vector distinction and the transform-composition semantics
//! the scene graph relies on.

pub mod float;
pub mod hpoint;
pub mod matrix;
pub mod point;
pub mod vec;

pub use float::{degrees_to_radians, radians_to_degrees, FloatExt, EPSILON};
pub use hpoint::{HPoint2, HPoint3};
pub use matrix::Matrix4x4;
pub use point::{Point2, Point3};
pub use vec::{Vec2, Vec2Ext, Vec3, Vec3Ext, Vec4};
