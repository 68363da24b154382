use glam::{Vec3, Vec4};

use crate::math::{degrees_to_radians, HPoint3, Vec3Ext};

use super::backend::TextureId;

/// RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color4(pub Vec4);

impl Color4 {
    pub const BLACK: Color4 = Color4(Vec4::new(0.0, 0.0, 0.0, 1.0));
    pub const WHITE: Color4 = Color4(Vec4::ONE);

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self(Vec4::new(r, g, b, a))
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        self.0.to_array()
    }
}

/// Spotlight cone parameters. The cutoff is stored as the cosine of the
/// half-angle, which is what the falloff computation compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub direction: Vec3,
    pub exponent: f32,
    pub cutoff_cos: f32,
}

/// A positional or directional light occupying one index of the shader's
/// light array.
///
/// During a draw traversal the light's parameters apply to its subtree
/// only: the traversal writes the enabled flag and parameters before
/// descending and writes the flag back to disabled afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub index: usize,
    pub enabled: bool,
    pub ambient: Color4,
    pub diffuse: Color4,
    pub specular: Color4,
    position: HPoint3,
    /// Constant, linear and quadratic attenuation coefficients.
    pub attenuation: (f32, f32, f32),
    pub spotlight: Option<Spotlight>,
}

impl LightNode {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            enabled: true,
            ambient: Color4::BLACK,
            diffuse: Color4::WHITE,
            specular: Color4::WHITE,
            position: HPoint3::direction(Vec3::Z),
            attenuation: (1.0, 0.0, 0.0),
            spotlight: None,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn position(&self) -> HPoint3 {
        self.position
    }

    /// Set the light position. `w == 0` means a directional light and the
    /// direction components are normalized so the shader can skip it.
    pub fn set_position(&mut self, position: HPoint3) {
        self.position = if position.is_directional() {
            HPoint3::direction(position.xyz().normalize_or_keep())
        } else {
            position
        };
    }

    /// Make this a spotlight. `cutoff_degrees` is the cone half-angle.
    pub fn set_spotlight(&mut self, direction: Vec3, exponent: f32, cutoff_degrees: f32) {
        self.spotlight = Some(Spotlight {
            direction: direction.normalize_or_keep(),
            exponent,
            cutoff_cos: degrees_to_radians(cutoff_degrees).cos(),
        });
    }

    pub fn turn_off_spotlight(&mut self) {
        self.spotlight = None;
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = (constant, linear, quadratic);
    }
}

/// Phong material parameters, applied to the subtree below the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialNode {
    pub ambient: Color4,
    pub diffuse: Color4,
    pub specular: Color4,
    pub emission: Color4,
    pub shininess: f32,
    pub texture: Option<TextureId>,
}

impl MaterialNode {
    pub fn new(ambient: Color4, diffuse: Color4, specular: Color4, shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            emission: Color4::BLACK,
            shininess,
            texture: None,
        }
    }

    /// Uniform ambient and diffuse color, no specular highlight.
    pub fn flat(color: Color4) -> Self {
        Self::new(color, color, Color4::BLACK, 1.0)
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_emission(mut self, emission: Color4) -> Self {
        self.emission = emission;
        self
    }
}
