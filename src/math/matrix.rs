use std::ops::{Mul, MulAssign};

use glam::{Mat4, Vec3};

use super::float::{degrees_to_radians, EPSILON};
use super::hpoint::HPoint3;
use super::point::Point3;

/// 4x4 affine/projective transform.
///
/// Element accessors are (row, col); the raw buffer form is the 16-float
/// column-major layout the rendering backend expects for matrix uniforms.
///
/// The `translate` / `rotate_*` / `scale` composers **post-multiply**
/// (`M = M * T`), so the last call in a chain is applied first to a point.
/// That is local-frame semantics: each call operates in the frame produced
/// by the calls before it, which is what makes hierarchical transforms in
/// the scene graph compose correctly. Rotation angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4x4(pub Mat4);

impl Matrix4x4 {
    pub const IDENTITY: Matrix4x4 = Matrix4x4(Mat4::IDENTITY);

    pub fn new() -> Self {
        Self::IDENTITY
    }

    pub fn set_identity(&mut self) {
        self.0 = Mat4::IDENTITY;
    }

    /// Element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0.col(col)[row]
    }

    /// Set the element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let mut cols = self.0.to_cols_array_2d();
        cols[col][row] = value;
        self.0 = Mat4::from_cols_array_2d(&cols);
    }

    /// Raw column-major buffer, ready to hand to a matrix uniform.
    pub fn to_array(&self) -> [f32; 16] {
        self.0.to_cols_array()
    }

    pub fn from_array(buf: &[f32; 16]) -> Self {
        Self(Mat4::from_cols_array(buf))
    }

    /// Post-multiply a translation.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.0 *= Mat4::from_translation(Vec3::new(x, y, z));
    }

    /// Post-multiply a rotation about the x axis (degrees, counter-clockwise).
    pub fn rotate_x(&mut self, degrees: f32) {
        self.0 *= Mat4::from_rotation_x(degrees_to_radians(degrees));
    }

    /// Post-multiply a rotation about the y axis (degrees, counter-clockwise).
    pub fn rotate_y(&mut self, degrees: f32) {
        self.0 *= Mat4::from_rotation_y(degrees_to_radians(degrees));
    }

    /// Post-multiply a rotation about the z axis (degrees, counter-clockwise).
    pub fn rotate_z(&mut self, degrees: f32) {
        self.0 *= Mat4::from_rotation_z(degrees_to_radians(degrees));
    }

    /// Post-multiply a rotation about an arbitrary axis (degrees). The axis
    /// does not need to be unit length.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        use super::vec::Vec3Ext;
        self.0 *= Mat4::from_axis_angle(axis.normalize_or_keep(), degrees_to_radians(degrees));
    }

    /// Post-multiply a scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.0 *= Mat4::from_scale(Vec3::new(x, y, z));
    }

    pub fn transpose(&self) -> Matrix4x4 {
        Matrix4x4(self.0.transpose())
    }

    /// General 4x4 inverse. Returns `None` for a singular matrix (|det|
    /// below [`EPSILON`]) instead of letting NaN propagate; a singular model
    /// matrix means a degenerate transform and the caller decides how to
    /// recover.
    pub fn inverse(&self) -> Option<Matrix4x4> {
        let det = self.0.determinant();
        if det.abs() < EPSILON {
            return None;
        }
        Some(Matrix4x4(self.0.inverse()))
    }

    /// Transform a point (implicit w = 1, with perspective divide).
    pub fn transform_point(&self, p: Point3) -> Point3 {
        Point3(self.0.project_point3(p.vec()))
    }

    /// Transform a vector: rotation and scale apply, translation does not.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.0.transform_vector3(v)
    }

    pub fn transform_hpoint(&self, p: HPoint3) -> HPoint3 {
        HPoint3(self.0 * p.vec4())
    }

    /// Right-handed view matrix looking from `eye` toward `center`.
    pub fn look_at(eye: Point3, center: Point3, up: Vec3) -> Matrix4x4 {
        Matrix4x4(Mat4::look_at_rh(eye.vec(), center.vec(), up))
    }

    /// Right-handed perspective projection with the [-1, 1] clip-depth
    /// convention. `fov_y` is in degrees.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4x4 {
        Matrix4x4(Mat4::perspective_rh_gl(
            degrees_to_radians(fov_y),
            aspect,
            near,
            far,
        ))
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Matrix4x4) -> Matrix4x4 {
        Matrix4x4(self.0 * rhs.0)
    }
}

impl MulAssign for Matrix4x4 {
    fn mul_assign(&mut self, rhs: Matrix4x4) {
        self.0 *= rhs.0;
    }
}

impl Mul<Point3> for Matrix4x4 {
    type Output = Point3;

    fn mul(self, rhs: Point3) -> Point3 {
        self.transform_point(rhs)
    }
}

impl Mul<Vec3> for Matrix4x4 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.transform_vector(rhs)
    }
}

impl Mul<HPoint3> for Matrix4x4 {
    type Output = HPoint3;

    fn mul(self, rhs: HPoint3) -> HPoint3 {
        self.transform_hpoint(rhs)
    }
}
