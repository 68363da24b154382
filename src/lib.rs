//! A small real-time 3D rendering core: a geometry/math toolkit, a
//! moving-sphere collision solver, and a retained scene graph with Draw and
//! Update traversals.
//!
//! The crate stops at the rendering-backend boundary. Geometry leaves hand
//! opaque buffer handles and matrices to a [`scene::RenderBackend`]
//! implementation; shader compilation, windowing, texture decoding and model
//! import all live on the other side of that trait.

pub mod collision;
pub mod geometry;
pub mod math;
pub mod scene;
pub mod utils;

pub use math::EPSILON;
