//! Rendering backend seam.
//!
//! The traversal in [`crate::scene`] never talks to a graphics API directly;
//! it publishes matrices, material and light parameters through
//! [`RenderBackend`], and a concrete implementation maps those calls onto
//! whatever API is in use. Tests drive the traversal with a recording
//! backend instead of a GPU.

use thiserror::Error;

/// Opaque handle to a compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Opaque handle to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Resolved uniform location within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniformSlot(pub i32);

/// Resolved vertex attribute location within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeSlot(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
    Points,
}

/// Geometry ready to draw: uploaded vertex data plus an optional index
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryBuffers {
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub primitive: Primitive,
}

/// A shader interface name the traversal requires was not found in the
/// program.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("shader program has no attribute named {0:?}")]
    MissingAttribute(String),
    #[error("shader program has no uniform named {0:?}")]
    MissingUniform(String),
}

/// What the traversal needs from a graphics API. `set_*` calls affect the
/// currently active program.
pub trait RenderBackend {
    /// Uniform location by name, `None` if the program does not expose it.
    fn uniform_slot(&self, program: ProgramId, name: &str) -> Option<UniformSlot>;

    /// Attribute location by name.
    fn attribute_slot(&self, program: ProgramId, name: &str) -> Option<AttributeSlot>;

    fn use_program(&mut self, program: ProgramId);

    /// Upload a matrix in column-major order.
    fn set_mat4(&mut self, slot: UniformSlot, value: &[f32; 16]);

    fn set_vec4(&mut self, slot: UniformSlot, value: [f32; 4]);

    fn set_vec3(&mut self, slot: UniformSlot, value: [f32; 3]);

    fn set_f32(&mut self, slot: UniformSlot, value: f32);

    fn set_i32(&mut self, slot: UniformSlot, value: i32);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn draw(&mut self, buffers: &GeometryBuffers, position_attribute: AttributeSlot);
}

/// Largest number of simultaneously enabled lights the shader interface
/// supports.
pub const MAX_LIGHTS: usize = 8;

/// Uniform slots for one element of the shader's light array.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightSlots {
    pub enabled: Option<UniformSlot>,
    pub spotlight: Option<UniformSlot>,
    pub position: Option<UniformSlot>,
    pub ambient: Option<UniformSlot>,
    pub diffuse: Option<UniformSlot>,
    pub specular: Option<UniformSlot>,
    pub att_constant: Option<UniformSlot>,
    pub att_linear: Option<UniformSlot>,
    pub att_quadratic: Option<UniformSlot>,
    pub spot_cutoff_cos: Option<UniformSlot>,
    pub spot_exponent: Option<UniformSlot>,
    pub spot_direction: Option<UniformSlot>,
}

impl LightSlots {
    fn resolve(backend: &dyn RenderBackend, program: ProgramId, index: usize) -> Self {
        let slot = |field: &str| {
            backend.uniform_slot(program, &format!("lights[{index}].{field}"))
        };
        Self {
            enabled: slot("enabled"),
            spotlight: slot("spotlight"),
            position: slot("position"),
            ambient: slot("ambient"),
            diffuse: slot("diffuse"),
            specular: slot("specular"),
            att_constant: slot("constant_attenuation"),
            att_linear: slot("linear_attenuation"),
            att_quadratic: slot("quadratic_attenuation"),
            spot_cutoff_cos: slot("spot_cutoff_cos"),
            spot_exponent: slot("spot_exponent"),
            spot_direction: slot("spot_direction"),
        }
    }
}

/// The scene traversal's view of a shader program's interface, resolved
/// up front so traversal itself cannot fail on a missing name.
///
/// Only the position attribute and the composite `pvm` matrix are
/// mandatory; everything else is optional so that flat, unlit or untextured
/// programs work without dummy uniforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramBindings {
    pub position: AttributeSlot,
    pub pvm_matrix: UniformSlot,
    pub model_matrix: Option<UniformSlot>,
    pub normal_matrix: Option<UniformSlot>,
    pub pv_matrix: Option<UniformSlot>,
    pub camera_position: Option<UniformSlot>,
    pub material_ambient: Option<UniformSlot>,
    pub material_diffuse: Option<UniformSlot>,
    pub material_specular: Option<UniformSlot>,
    pub material_emission: Option<UniformSlot>,
    pub material_shininess: Option<UniformSlot>,
    pub use_texture: Option<UniformSlot>,
    pub texture_unit: Option<UniformSlot>,
    pub light_count: Option<UniformSlot>,
    pub lights: [LightSlots; MAX_LIGHTS],
}

impl ProgramBindings {
    /// Look up every name the traversal publishes. Called once per program
    /// at scene build time; the traversal then works entirely from slots.
    pub fn resolve(
        backend: &dyn RenderBackend,
        program: ProgramId,
    ) -> Result<Self, BindingError> {
        let position = backend
            .attribute_slot(program, "vertex_position")
            .ok_or_else(|| BindingError::MissingAttribute("vertex_position".into()))?;
        let pvm_matrix = backend
            .uniform_slot(program, "pvm_matrix")
            .ok_or_else(|| BindingError::MissingUniform("pvm_matrix".into()))?;

        let mut lights = [LightSlots::default(); MAX_LIGHTS];
        for (index, entry) in lights.iter_mut().enumerate() {
            *entry = LightSlots::resolve(backend, program, index);
        }

        Ok(Self {
            position,
            pvm_matrix,
            model_matrix: backend.uniform_slot(program, "model_matrix"),
            normal_matrix: backend.uniform_slot(program, "normal_matrix"),
            pv_matrix: backend.uniform_slot(program, "pv_matrix"),
            camera_position: backend.uniform_slot(program, "camera_position"),
            material_ambient: backend.uniform_slot(program, "material_ambient"),
            material_diffuse: backend.uniform_slot(program, "material_diffuse"),
            material_specular: backend.uniform_slot(program, "material_specular"),
            material_emission: backend.uniform_slot(program, "material_emission"),
            material_shininess: backend.uniform_slot(program, "material_shininess"),
            use_texture: backend.uniform_slot(program, "use_texture"),
            texture_unit: backend.uniform_slot(program, "texture_unit"),
            light_count: backend.uniform_slot(program, "light_count"),
            lights,
        })
    }
}
