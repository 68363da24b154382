//! Retained scene graph with separate draw and update traversals.
//!
//! Nodes live in a slotmap arena keyed by [`NodeId`]; parent/child links are
//! plain id lists, and an [`NodeKind::Instance`] node lets one subtree
//! appear in several places without duplicating it. A draw traversal
//! threads a [`SceneState`] down the tree and publishes everything through
//! the [`RenderBackend`] trait; an update traversal ticks the animations
//! attached to transform nodes.

pub mod backend;
pub mod light;
pub mod particles;
pub mod state;

use glam::Vec3;
use log::warn;
use slotmap::SlotMap;

use crate::collision::{self, MovingSphere};
use crate::geometry::Plane;
use crate::math::{Matrix4x4, Point3, Vec3Ext};
use crate::warn_once;

pub use backend::{GeometryBuffers, ProgramBindings, ProgramId, RenderBackend};
pub use light::{Color4, LightNode, MaterialNode};
pub use particles::ParticleEmitter;
pub use state::SceneState;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`].
    pub struct NodeId;
}

/// A transform node's optional per-frame behavior.
#[derive(Debug, Clone)]
pub enum Animation {
    /// Bouncing ball: the node's local matrix tracks the sphere's position
    /// and radius each frame.
    Ball(MovingSphere),
    Particles(ParticleEmitter),
}

/// Composable local transform, applied to the subtree below the node.
#[derive(Debug, Clone, Default)]
pub struct TransformNode {
    pub local: Matrix4x4,
    pub animation: Option<Animation>,
}

impl TransformNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animation(animation: Animation) -> Self {
        let local = match &animation {
            Animation::Ball(ball) => ball.transform(),
            Animation::Particles(_) => Matrix4x4::IDENTITY,
        };
        Self {
            local,
            animation: Some(animation),
        }
    }

    pub fn set_identity(&mut self) {
        self.local.set_identity();
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.local.translate(x, y, z);
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.local.rotate_x(degrees);
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.local.rotate_y(degrees);
    }

    pub fn rotate_z(&mut self, degrees: f32) {
        self.local.rotate_z(degrees);
    }

    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.local.rotate(degrees, axis);
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.local.scale(x, y, z);
    }
}

/// Viewpoint: a view matrix from eye / look-at / up and a perspective
/// projection. The camera's orthonormal axes are kept current so callers
/// can move the eye in view space (truck along `u`, pedestal along `v`,
/// dolly along `n`).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraNode {
    position: Point3,
    look_at: Point3,
    up: Vec3,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Matrix4x4,
    projection: Matrix4x4,
    u: Vec3,
    v: Vec3,
    n: Vec3,
}

impl CameraNode {
    pub fn new(position: Point3, look_at: Point3, up: Vec3) -> Self {
        let mut camera = Self {
            position,
            look_at,
            up,
            fov_y: 50.0,
            aspect: 1.0,
            near: 1.0,
            far: 1000.0,
            view: Matrix4x4::IDENTITY,
            projection: Matrix4x4::IDENTITY,
            u: Vec3::X,
            v: Vec3::Y,
            n: Vec3::Z,
        };
        camera.update_view();
        camera.update_projection();
        camera
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.update_projection();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    pub fn set_view(&mut self, position: Point3, look_at: Point3, up: Vec3) {
        self.position = position;
        self.look_at = look_at;
        self.up = up;
        self.update_view();
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Move the eye by offsets along the camera's own axes, keeping the
    /// look-at point fixed relative to the eye.
    pub fn slide(&mut self, du: f32, dv: f32, dn: f32) {
        let offset = self.u * du + self.v * dv + self.n * dn;
        self.position = self.position + offset;
        self.look_at = self.look_at + offset;
        self.update_view();
    }

    pub fn view(&self) -> Matrix4x4 {
        self.view
    }

    pub fn projection(&self) -> Matrix4x4 {
        self.projection
    }

    /// The camera's right, up and backward axes.
    pub fn axes(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.n)
    }

    fn update_view(&mut self) {
        // n points backward (right-handed view space looks down -n).
        self.n = (self.position - self.look_at).normalize_or_keep();
        self.u = self.up.cross(self.n).normalize_or_keep();
        self.v = self.n.cross(self.u);
        self.view = Matrix4x4::look_at(self.position, self.look_at, self.up);
    }

    fn update_projection(&mut self) {
        self.projection = Matrix4x4::perspective(self.fov_y, self.aspect, self.near, self.far);
    }
}

/// Activates a shader program for the subtree below (and, by design, for
/// later siblings too: the binding is not restored on the way back up, so
/// order shader nodes deliberately).
#[derive(Debug, Clone, Copy)]
pub struct ShaderNode {
    pub program: ProgramId,
    pub bindings: ProgramBindings,
}

impl ShaderNode {
    /// Resolve the program's interface up front; failures surface here, at
    /// scene build time, never during a draw.
    pub fn new(
        backend: &dyn RenderBackend,
        program: ProgramId,
    ) -> Result<Self, backend::BindingError> {
        Ok(Self {
            program,
            bindings: ProgramBindings::resolve(backend, program)?,
        })
    }
}

/// Leaf that issues one draw call.
#[derive(Debug, Clone, Copy)]
pub struct GeometryNode {
    pub buffers: GeometryBuffers,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure grouping, no effect on state.
    Group,
    Transform(TransformNode),
    Material(MaterialNode),
    Light(LightNode),
    Camera(CameraNode),
    Shader(ShaderNode),
    Geometry(GeometryNode),
    /// Draws another node's subtree in place, sharing it rather than
    /// copying it.
    Instance(NodeId),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    children: Vec<NodeId>,
    name: Option<String>,
}

/// The node arena plus the root of the tree.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            kind: NodeKind::Group,
            children: Vec::new(),
            name: Some("root".into()),
        });
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert a node under `parent` (the root when `None`).
    pub fn add(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = self.nodes.insert(Node {
            kind,
            children: Vec::new(),
            name: None,
        });
        let parent = parent.unwrap_or(self.root);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        } else {
            warn!("adding under a removed parent, attaching to root instead");
            self.nodes[self.root].children.push(id);
        }
        id
    }

    /// Insert an instance of `target` under `parent`. Refused (returning
    /// `None`) when `parent` is reachable from `target` through children or
    /// earlier instances, since the draw traversal would recurse forever.
    pub fn add_instance(&mut self, parent: Option<NodeId>, target: NodeId) -> Option<NodeId> {
        let parent = parent.unwrap_or(self.root);
        if target == parent || self.is_ancestor(target, parent) {
            warn!("refusing to instance a node inside its own subtree");
            return None;
        }
        Some(self.add(Some(parent), NodeKind::Instance(target)))
    }

    /// Whether `node` is reachable from `candidate` through children or
    /// instance targets. Instance edges count: an instance under
    /// `candidate` that targets `node` would make the draw traversal visit
    /// `node` just as a direct child would.
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut visited = std::collections::HashSet::new();
        let mut stack = vec![candidate];
        while let Some(id) = stack.pop() {
            if id == node {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(n) = self.nodes.get(id) {
                if let NodeKind::Instance(target) = n.kind {
                    stack.push(target);
                }
                stack.extend(n.children.iter().copied());
            }
        }
        false
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id).map(|n| &mut n.kind)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| &n.children)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.into());
        }
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.name.as_deref())
    }

    /// Draw the whole tree. `state` is re-initialized first, so a frame is
    /// `graph.update(dt)` then `graph.draw(&mut state, backend)`.
    pub fn draw(&self, state: &mut SceneState, backend: &mut dyn RenderBackend) {
        state.init();
        self.draw_node(self.root, state, backend);
        debug_assert_eq!(state.stack_depth(), 0);
    }

    fn draw_children(&self, id: NodeId, state: &mut SceneState, backend: &mut dyn RenderBackend) {
        // The children list is never mutated during a draw, but an id could
        // in principle be stale after node removal; get() skips those.
        if let Some(node) = self.nodes.get(id) {
            for &child in &node.children {
                self.draw_node(child, state, backend);
            }
        }
    }

    fn draw_node(&self, id: NodeId, state: &mut SceneState, backend: &mut dyn RenderBackend) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Group => self.draw_children(id, state, backend),
            NodeKind::Transform(t) => self.draw_transform(id, t, state, backend),
            NodeKind::Material(m) => self.draw_material(id, m, state, backend),
            NodeKind::Light(l) => self.draw_light(id, l, state, backend),
            NodeKind::Camera(c) => {
                Self::apply_camera(c, state, backend);
                self.draw_children(id, state, backend);
            }
            NodeKind::Shader(s) => {
                backend.use_program(s.program);
                state.bindings = s.bindings;
                // Matrices already accumulated on the path down must reach
                // the fresh program too.
                Self::publish_matrices(state, backend);
                self.draw_children(id, state, backend);
            }
            NodeKind::Geometry(g) => {
                backend.draw(&g.buffers, state.bindings.position);
            }
            NodeKind::Instance(target) => self.draw_node(*target, state, backend),
        }
    }

    fn draw_transform(
        &self,
        id: NodeId,
        t: &TransformNode,
        state: &mut SceneState,
        backend: &mut dyn RenderBackend,
    ) {
        let depth = state.stack_depth();
        state.push_transforms();
        state.model_matrix *= t.local;
        Self::publish_matrices(state, backend);

        self.draw_children(id, state, backend);

        state.pop_transforms();
        debug_assert_eq!(state.stack_depth(), depth);
        // Siblings drawn after this subtree see the restored matrix.
        Self::publish_matrices(state, backend);
    }

    /// Write the model, normal and composite matrices for the current
    /// model matrix to the active program.
    fn publish_matrices(state: &SceneState, backend: &mut dyn RenderBackend) {
        let b = &state.bindings;
        backend.set_mat4(b.pvm_matrix, &(state.pv * state.model_matrix).to_array());
        if let Some(slot) = b.model_matrix {
            backend.set_mat4(slot, &state.model_matrix.to_array());
        }
        if let Some(slot) = b.normal_matrix {
            // Inverse-transpose so normals stay perpendicular under
            // non-uniform scale. A singular model matrix has no inverse;
            // the un-inverted matrix is the least-wrong fallback.
            let normal = match state.model_matrix.inverse() {
                Some(inv) => inv.transpose(),
                None => {
                    warn_once!("singular model matrix, normal matrix falls back to model");
                    state.model_matrix
                }
            };
            backend.set_mat4(slot, &normal.to_array());
        }
    }

    fn apply_camera(c: &CameraNode, state: &mut SceneState, backend: &mut dyn RenderBackend) {
        state.projection = c.projection();
        state.view = c.view();
        state.pv = c.projection() * c.view();
        state.camera_position = c.position();

        let b = &state.bindings;
        if let Some(slot) = b.pv_matrix {
            backend.set_mat4(slot, &state.pv.to_array());
        }
        if let Some(slot) = b.camera_position {
            backend.set_vec3(slot, state.camera_position.vec().to_array());
        }
        Self::publish_matrices(state, backend);
    }

    fn draw_material(
        &self,
        id: NodeId,
        m: &MaterialNode,
        state: &mut SceneState,
        backend: &mut dyn RenderBackend,
    ) {
        let b = state.bindings;
        if let Some(slot) = b.material_ambient {
            backend.set_vec4(slot, m.ambient.to_array());
        }
        if let Some(slot) = b.material_diffuse {
            backend.set_vec4(slot, m.diffuse.to_array());
        }
        if let Some(slot) = b.material_specular {
            backend.set_vec4(slot, m.specular.to_array());
        }
        if let Some(slot) = b.material_emission {
            backend.set_vec4(slot, m.emission.to_array());
        }
        if let Some(slot) = b.material_shininess {
            backend.set_f32(slot, m.shininess);
        }
        if let Some(texture) = m.texture {
            backend.bind_texture(0, texture);
            if let Some(slot) = b.texture_unit {
                backend.set_i32(slot, 0);
            }
            if let Some(slot) = b.use_texture {
                backend.set_i32(slot, 1);
            }
        } else if let Some(slot) = b.use_texture {
            backend.set_i32(slot, 0);
        }

        self.draw_children(id, state, backend);

        // Texturing must not leak to siblings; color parameters may, the
        // next material overwrites them anyway.
        if m.texture.is_some() {
            if let Some(slot) = state.bindings.use_texture {
                backend.set_i32(slot, 0);
            }
        }
    }

    fn draw_light(
        &self,
        id: NodeId,
        l: &LightNode,
        state: &mut SceneState,
        backend: &mut dyn RenderBackend,
    ) {
        if l.index >= backend::MAX_LIGHTS {
            warn_once!("light index beyond the shader's light array, skipping");
            self.draw_children(id, state, backend);
            return;
        }
        let slots = state.bindings.lights[l.index];

        if !l.enabled {
            if let Some(slot) = slots.enabled {
                backend.set_i32(slot, 0);
            }
            self.draw_children(id, state, backend);
            return;
        }

        if let Some(slot) = slots.enabled {
            backend.set_i32(slot, 1);
        }
        if let Some(slot) = slots.position {
            backend.set_vec4(slot, l.position().vec4().to_array());
        }
        if let Some(slot) = slots.ambient {
            backend.set_vec4(slot, l.ambient.to_array());
        }
        if let Some(slot) = slots.diffuse {
            backend.set_vec4(slot, l.diffuse.to_array());
        }
        if let Some(slot) = slots.specular {
            backend.set_vec4(slot, l.specular.to_array());
        }
        let (constant, linear, quadratic) = l.attenuation;
        if let Some(slot) = slots.att_constant {
            backend.set_f32(slot, constant);
        }
        if let Some(slot) = slots.att_linear {
            backend.set_f32(slot, linear);
        }
        if let Some(slot) = slots.att_quadratic {
            backend.set_f32(slot, quadratic);
        }
        match l.spotlight {
            Some(spot) => {
                if let Some(slot) = slots.spotlight {
                    backend.set_i32(slot, 1);
                }
                if let Some(slot) = slots.spot_direction {
                    backend.set_vec3(slot, spot.direction.to_array());
                }
                if let Some(slot) = slots.spot_cutoff_cos {
                    backend.set_f32(slot, spot.cutoff_cos);
                }
                if let Some(slot) = slots.spot_exponent {
                    backend.set_f32(slot, spot.exponent);
                }
            }
            None => {
                if let Some(slot) = slots.spotlight {
                    backend.set_i32(slot, 0);
                }
            }
        }

        // The shader iterates light indices 0..light_count; keep the count
        // high enough to reach this light.
        if l.index as i32 > state.max_enabled_light {
            state.max_enabled_light = l.index as i32;
        }
        if let Some(slot) = state.bindings.light_count {
            backend.set_i32(slot, state.max_enabled_light + 1);
        }

        self.draw_children(id, state, backend);

        // Scoped: the light only applies to the subtree above.
        if let Some(slot) = slots.enabled {
            backend.set_i32(slot, 0);
        }
    }

    /// Tick every animation by `dt` seconds. Ball animations consume the
    /// contact found by the last [`step_balls`](SceneGraph::step_balls) and
    /// refresh their node's local matrix; instances are skipped so shared
    /// subtrees tick once.
    pub fn update(&mut self, dt: f32) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if let NodeKind::Transform(t) = &mut node.kind {
                match &mut t.animation {
                    Some(Animation::Ball(ball)) => {
                        ball.advance();
                        t.local = ball.transform();
                    }
                    Some(Animation::Particles(emitter)) => emitter.tick(dt),
                    None => {}
                }
            }
            if !matches!(node.kind, NodeKind::Instance(_)) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Run one frame of collision detection over the ball animations at
    /// `ids` against each other and the boundary `planes`. The next
    /// [`update`](SceneGraph::update) consumes the contacts.
    pub fn step_balls(&mut self, ids: &[NodeId], planes: &[Plane]) {
        let mut balls: Vec<MovingSphere> = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.kind(id) {
                Some(NodeKind::Transform(TransformNode {
                    animation: Some(Animation::Ball(ball)),
                    ..
                })) => balls.push(*ball),
                _ => {
                    warn!("step_balls given a node without a ball animation");
                    return;
                }
            }
        }

        collision::resolve(&mut balls, planes);

        for (&id, ball) in ids.iter().zip(balls) {
            if let Some(NodeKind::Transform(t)) = self.kind_mut(id) {
                t.animation = Some(Animation::Ball(ball));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::backend::*;
    use super::light::*;
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        UseProgram(u32),
        Mat4(i32, [f32; 16]),
        Vec4(i32, [f32; 4]),
        Vec3(i32, [f32; 3]),
        F32(i32, f32),
        I32(i32, i32),
        Texture(u32, u32),
        Draw(u32),
    }

    /// Records every backend call; uniform and attribute names are interned
    /// so tests can look up the slot a name resolved to.
    #[derive(Default)]
    struct Recorder {
        slots: RefCell<HashMap<String, i32>>,
        calls: Vec<Call>,
    }

    impl Recorder {
        fn intern(&self, name: &str) -> i32 {
            let mut slots = self.slots.borrow_mut();
            let next = slots.len() as i32;
            *slots.entry(name.to_string()).or_insert(next)
        }

        fn slot(&self, name: &str) -> i32 {
            self.intern(name)
        }

        fn draws(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Draw(_)))
                .count()
        }
    }

    impl RenderBackend for Recorder {
        fn uniform_slot(&self, _program: ProgramId, name: &str) -> Option<UniformSlot> {
            Some(UniformSlot(self.intern(name)))
        }

        fn attribute_slot(&self, _program: ProgramId, name: &str) -> Option<AttributeSlot> {
            Some(AttributeSlot(self.intern(name)))
        }

        fn use_program(&mut self, program: ProgramId) {
            self.calls.push(Call::UseProgram(program.0));
        }

        fn set_mat4(&mut self, slot: UniformSlot, value: &[f32; 16]) {
            self.calls.push(Call::Mat4(slot.0, *value));
        }

        fn set_vec4(&mut self, slot: UniformSlot, value: [f32; 4]) {
            self.calls.push(Call::Vec4(slot.0, value));
        }

        fn set_vec3(&mut self, slot: UniformSlot, value: [f32; 3]) {
            self.calls.push(Call::Vec3(slot.0, value));
        }

        fn set_f32(&mut self, slot: UniformSlot, value: f32) {
            self.calls.push(Call::F32(slot.0, value));
        }

        fn set_i32(&mut self, slot: UniformSlot, value: i32) {
            self.calls.push(Call::I32(slot.0, value));
        }

        fn bind_texture(&mut self, unit: u32, texture: TextureId) {
            self.calls.push(Call::Texture(unit, texture.0));
        }

        fn draw(&mut self, buffers: &GeometryBuffers, _position: AttributeSlot) {
            self.calls.push(Call::Draw(buffers.vertex_buffer.0));
        }
    }

    fn quad(buffer: u32) -> NodeKind {
        NodeKind::Geometry(GeometryNode {
            buffers: GeometryBuffers {
                vertex_buffer: BufferId(buffer),
                index_buffer: None,
                vertex_count: 4,
                index_count: 0,
                primitive: Primitive::Triangles,
            },
        })
    }

    fn bindings(backend: &Recorder) -> ProgramBindings {
        ProgramBindings::resolve(backend, ProgramId(1)).unwrap()
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn resolve_fails_on_missing_pvm() {
        struct NoPvm;
        impl RenderBackend for NoPvm {
            fn uniform_slot(&self, _: ProgramId, _: &str) -> Option<UniformSlot> {
                None
            }
            fn attribute_slot(&self, _: ProgramId, _: &str) -> Option<AttributeSlot> {
                Some(AttributeSlot(0))
            }
            fn use_program(&mut self, _: ProgramId) {}
            fn set_mat4(&mut self, _: UniformSlot, _: &[f32; 16]) {}
            fn set_vec4(&mut self, _: UniformSlot, _: [f32; 4]) {}
            fn set_vec3(&mut self, _: UniformSlot, _: [f32; 3]) {}
            fn set_f32(&mut self, _: UniformSlot, _: f32) {}
            fn set_i32(&mut self, _: UniformSlot, _: i32) {}
            fn bind_texture(&mut self, _: u32, _: TextureId) {}
            fn draw(&mut self, _: &GeometryBuffers, _: AttributeSlot) {}
        }
        let err = ProgramBindings::resolve(&NoPvm, ProgramId(1)).unwrap_err();
        assert_eq!(err, BindingError::MissingUniform("pvm_matrix".into()));
    }

    #[test]
    fn sibling_transforms_do_not_leak() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let mut left = TransformNode::new();
        left.translate(10.0, 0.0, 0.0);
        let left_id = graph.add(None, NodeKind::Transform(left));
        graph.add(Some(left_id), quad(1));

        let mut right = TransformNode::new();
        right.translate(0.0, 20.0, 0.0);
        let right_id = graph.add(None, NodeKind::Transform(right));
        graph.add(Some(right_id), quad(2));

        graph.draw(&mut state, &mut backend);

        // The pvm published just before each draw carries only that
        // sibling's translation (pv is identity here, so pvm == model).
        let pvm = backend.slot("pvm_matrix");
        let mut seen = Vec::new();
        for call in &backend.calls {
            match call {
                Call::Mat4(slot, m) if *slot == pvm => seen.push(*m),
                Call::Draw(buffer) => {
                    let m = seen.last().unwrap();
                    // Translation lives in elements 12..14 column-major.
                    match buffer {
                        1 => assert_eq!((m[12], m[13]), (10.0, 0.0)),
                        2 => assert_eq!((m[12], m[13]), (0.0, 20.0)),
                        _ => unreachable!(),
                    }
                }
                _ => {}
            }
        }
        assert_eq!(backend.draws(), 2);
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn nested_transforms_compose() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let mut outer = TransformNode::new();
        outer.translate(5.0, 0.0, 0.0);
        let outer_id = graph.add(None, NodeKind::Transform(outer));
        let mut inner = TransformNode::new();
        inner.translate(0.0, 7.0, 0.0);
        let inner_id = graph.add(Some(outer_id), NodeKind::Transform(inner));
        graph.add(Some(inner_id), quad(1));

        graph.draw(&mut state, &mut backend);

        let pvm = backend.slot("pvm_matrix");
        let mut last = None;
        for call in &backend.calls {
            match call {
                Call::Mat4(slot, m) if *slot == pvm => last = Some(*m),
                Call::Draw(_) => {
                    let m = last.unwrap();
                    assert_eq!((m[12], m[13], m[14]), (5.0, 7.0, 0.0));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn light_applies_to_its_subtree_only() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let mut light = LightNode::new(0);
        light.set_position(crate::math::HPoint3::new(0.0, 10.0, 0.0, 1.0));
        let light_id = graph.add(None, NodeKind::Light(light));
        graph.add(Some(light_id), quad(1));
        graph.add(None, quad(2)); // outside the light's scope

        graph.draw(&mut state, &mut backend);

        let enabled = backend.slot("lights[0].enabled");
        let sequence: Vec<&Call> = backend
            .calls
            .iter()
            .filter(|c| matches!(c, Call::I32(s, _) if *s == enabled) || matches!(c, Call::Draw(_)))
            .collect();
        assert_eq!(
            sequence,
            vec![
                &Call::I32(enabled, 1),
                &Call::Draw(1),
                &Call::I32(enabled, 0),
                &Call::Draw(2),
            ]
        );
    }

    #[test]
    fn light_count_tracks_highest_index() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let outer = graph.add(None, NodeKind::Light(LightNode::new(0)));
        let inner = graph.add(Some(outer), NodeKind::Light(LightNode::new(2)));
        graph.add(Some(inner), quad(1));

        graph.draw(&mut state, &mut backend);
        assert_eq!(state.max_enabled_light, 2);

        let count = backend.slot("light_count");
        let counts: Vec<i32> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::I32(s, v) if *s == count => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![1, 3]);
    }

    #[test]
    fn disabled_light_publishes_no_parameters() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let mut light = LightNode::new(1);
        light.disable();
        let light_id = graph.add(None, NodeKind::Light(light));
        graph.add(Some(light_id), quad(1));

        graph.draw(&mut state, &mut backend);

        let diffuse = backend.slot("lights[1].diffuse");
        assert!(!backend
            .calls
            .iter()
            .any(|c| matches!(c, Call::Vec4(s, _) if *s == diffuse)));
        assert_eq!(backend.draws(), 1);
    }

    #[test]
    fn textured_material_restores_use_texture() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let material = MaterialNode::flat(Color4::rgb(1.0, 0.0, 0.0)).with_texture(TextureId(9));
        let mat_id = graph.add(None, NodeKind::Material(material));
        graph.add(Some(mat_id), quad(1));

        graph.draw(&mut state, &mut backend);

        let use_texture = backend.slot("use_texture");
        let sequence: Vec<&Call> = backend
            .calls
            .iter()
            .filter(|c| {
                matches!(c, Call::I32(s, _) if *s == use_texture)
                    || matches!(c, Call::Draw(_) | Call::Texture(..))
            })
            .collect();
        assert_eq!(
            sequence,
            vec![
                &Call::Texture(0, 9),
                &Call::I32(use_texture, 1),
                &Call::Draw(1),
                &Call::I32(use_texture, 0),
            ]
        );
    }

    #[test]
    fn camera_publishes_pv_and_position() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let camera = CameraNode::new(
            Point3::new(0.0, 0.0, 10.0),
            Point3::ORIGIN,
            Vec3::Y,
        );
        let expected_pv = camera.projection() * camera.view();
        let cam_id = graph.add(None, NodeKind::Camera(camera));
        graph.add(Some(cam_id), quad(1));

        graph.draw(&mut state, &mut backend);

        assert_eq!(state.pv, expected_pv);
        assert_eq!(state.camera_position, Point3::new(0.0, 0.0, 10.0));
        let pv = backend.slot("pv_matrix");
        assert!(backend
            .calls
            .iter()
            .any(|c| matches!(c, Call::Mat4(s, m) if *s == pv && *m == expected_pv.to_array())));
    }

    #[test]
    fn camera_axes_are_orthonormal() {
        let camera = CameraNode::new(
            Point3::new(3.0, 4.0, 5.0),
            Point3::ORIGIN,
            Vec3::Y,
        );
        let (u, v, n) = camera.axes();
        assert!(u.dot(v).abs() < 1e-5);
        assert!(v.dot(n).abs() < 1e-5);
        assert!(n.dot(u).abs() < 1e-5);
        assert!((u.length() - 1.0).abs() < 1e-5);
        // n points from look-at toward the eye.
        assert!(n.dot(Vec3::new(3.0, 4.0, 5.0)) > 0.0);
    }

    #[test]
    fn camera_slide_moves_along_axes() {
        let mut camera = CameraNode::new(
            Point3::new(0.0, 0.0, 10.0),
            Point3::ORIGIN,
            Vec3::Y,
        );
        camera.slide(2.0, 3.0, -4.0);
        // u = +x, v = +y, n = +z for this setup.
        assert!(camera.position().approx_eq(Point3::new(2.0, 3.0, 6.0)));
    }

    #[test]
    fn shader_node_switches_program() {
        let mut backend = Recorder::default();
        let shader = ShaderNode::new(&backend, ProgramId(42)).unwrap();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let shader_id = graph.add(None, NodeKind::Shader(shader));
        graph.add(Some(shader_id), quad(1));

        graph.draw(&mut state, &mut backend);

        let use_at = backend
            .calls
            .iter()
            .position(|c| *c == Call::UseProgram(42))
            .expect("program activated");
        let draw_at = backend
            .calls
            .iter()
            .position(|c| matches!(c, Call::Draw(_)))
            .unwrap();
        assert!(use_at < draw_at);
    }

    #[test]
    fn instance_draws_target_subtree_again() {
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let mut shape = TransformNode::new();
        shape.scale(2.0, 2.0, 2.0);
        let shape_id = graph.add(None, NodeKind::Transform(shape));
        graph.add(Some(shape_id), quad(1));

        let mut offset = TransformNode::new();
        offset.translate(30.0, 0.0, 0.0);
        let offset_id = graph.add(None, NodeKind::Transform(offset));
        graph
            .add_instance(Some(offset_id), shape_id)
            .expect("valid instance");

        graph.draw(&mut state, &mut backend);
        assert_eq!(backend.draws(), 2);
    }

    #[test]
    fn instance_inside_own_subtree_is_refused() {
        init_logging();
        let mut graph = SceneGraph::new();
        let outer = graph.add(None, NodeKind::Group);
        let inner = graph.add(Some(outer), NodeKind::Group);
        assert!(graph.add_instance(Some(inner), outer).is_none());
        assert!(graph.add_instance(Some(outer), outer).is_none());
        // Instancing a sibling subtree is fine.
        let other = graph.add(None, NodeKind::Group);
        assert!(graph.add_instance(Some(other), outer).is_some());
    }

    #[test]
    fn mutual_instances_between_siblings_are_refused() {
        init_logging();
        let mut backend = Recorder::default();
        let mut state = SceneState::new(bindings(&backend));
        let mut graph = SceneGraph::new();

        let a = graph.add(None, NodeKind::Group);
        let b = graph.add(None, NodeKind::Group);
        graph.add(Some(b), quad(1));

        // a instancing b is fine; b instancing a back would make each
        // subtree reachable from the other and the draw never terminate.
        assert!(graph.add_instance(Some(a), b).is_some());
        assert!(graph.add_instance(Some(b), a).is_none());

        // The refused edge was not inserted: the draw terminates, visiting
        // b's geometry directly and once more through a's instance.
        graph.draw(&mut state, &mut backend);
        assert_eq!(backend.draws(), 2);
    }

    #[test]
    fn instance_chain_cycle_is_refused() {
        init_logging();
        let mut graph = SceneGraph::new();
        let a = graph.add(None, NodeKind::Group);
        let b = graph.add(None, NodeKind::Group);
        let c = graph.add(None, NodeKind::Group);
        assert!(graph.add_instance(Some(a), b).is_some());
        assert!(graph.add_instance(Some(b), c).is_some());
        // Closing the a -> b -> c chain into a loop.
        assert!(graph.add_instance(Some(c), a).is_none());
    }

    #[test]
    fn update_advances_ball_and_local_matrix() {
        let mut graph = SceneGraph::new();
        let ball = MovingSphere::new(Point3::new(0.0, 0.0, 10.0), Vec3::X, 2.0, 3.0);
        let id = graph.add(
            None,
            NodeKind::Transform(TransformNode::with_animation(Animation::Ball(ball))),
        );

        graph.update(1.0 / 60.0);

        let Some(NodeKind::Transform(t)) = graph.kind(id) else {
            panic!("transform survives update");
        };
        let Some(Animation::Ball(moved)) = &t.animation else {
            panic!("ball survives update");
        };
        assert!(moved.position.approx_eq(Point3::new(2.0, 0.0, 10.0)));
        // The local matrix tracked the move: x translation lives at (0, 3).
        assert!((t.local.get(0, 3) - 2.0).abs() < 1e-5);
        assert!((t.local.get(0, 0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn step_balls_reflects_on_next_update() {
        let mut graph = SceneGraph::new();
        let ball = MovingSphere::new(Point3::new(0.0, 0.0, 6.0), -Vec3::Z, 8.0, 2.0);
        let id = graph.add(
            None,
            NodeKind::Transform(TransformNode::with_animation(Animation::Ball(ball))),
        );
        let floor = Plane::from_point_normal(Point3::ORIGIN, Vec3::Z);

        graph.step_balls(&[id], &[floor]);
        graph.update(1.0 / 60.0);

        let Some(NodeKind::Transform(t)) = graph.kind(id) else {
            panic!("transform survives update");
        };
        let Some(Animation::Ball(moved)) = &t.animation else {
            panic!("ball survives update");
        };
        // Half a frame down, reflected, half a frame back up.
        assert!(moved.position.approx_eq(Point3::new(0.0, 0.0, 6.0)));
        assert!(moved.direction.distance_squared(Vec3::Z) < 1e-6);
    }
}
