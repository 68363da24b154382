use log::warn;

use crate::math::{Matrix4x4, Point3};

use super::backend::ProgramBindings;

/// Mutable state threaded through a draw traversal.
///
/// Transform nodes save and restore the composite model matrix around their
/// subtree with [`push_transforms`] / [`pop_transforms`]; camera and shader
/// nodes overwrite the view/projection fields and the active program
/// bindings for everything drawn after them.
///
/// [`push_transforms`]: SceneState::push_transforms
/// [`pop_transforms`]: SceneState::pop_transforms
#[derive(Debug, Clone)]
pub struct SceneState {
    /// Composite model matrix accumulated down the current path.
    pub model_matrix: Matrix4x4,
    /// Projection * view, recomputed when a camera node is visited.
    pub pv: Matrix4x4,
    pub projection: Matrix4x4,
    pub view: Matrix4x4,
    pub camera_position: Point3,
    /// Interface of the most recently activated shader program.
    pub bindings: ProgramBindings,
    /// Highest light index enabled so far in this traversal, or -1. The
    /// shader only iterates lights up to this index.
    pub max_enabled_light: i32,
    stack: Vec<Matrix4x4>,
}

impl SceneState {
    pub fn new(bindings: ProgramBindings) -> Self {
        Self {
            model_matrix: Matrix4x4::IDENTITY,
            pv: Matrix4x4::IDENTITY,
            projection: Matrix4x4::IDENTITY,
            view: Matrix4x4::IDENTITY,
            camera_position: Point3::ORIGIN,
            bindings,
            max_enabled_light: -1,
            stack: Vec::new(),
        }
    }

    /// Reset per-frame fields. Call at the start of each frame's traversal.
    pub fn init(&mut self) {
        self.model_matrix = Matrix4x4::IDENTITY;
        self.max_enabled_light = -1;
        self.stack.clear();
    }

    /// Save the current model matrix; restored by the matching
    /// [`pop_transforms`](SceneState::pop_transforms).
    pub fn push_transforms(&mut self) {
        self.stack.push(self.model_matrix);
    }

    /// Restore the model matrix saved by the matching push. An unbalanced
    /// pop falls back to the identity rather than panicking mid-frame.
    pub fn pop_transforms(&mut self) {
        match self.stack.pop() {
            Some(m) => self.model_matrix = m,
            None => {
                warn!("transform stack underflow, resetting model matrix");
                self.model_matrix = Matrix4x4::IDENTITY;
            }
        }
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}
