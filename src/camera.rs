use glam::Vec2;
use winit::keyboard::KeyCode;

use crate::input::InputState;

/// Default camera pan speed in world pixels per second.
pub const DEFAULT_CAMERA_SPEED: f32 = 300.0;

// ── DirectionBindings ────────────────────────────────────────────────────────

/// Keys polled for camera movement each tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectionBindings {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for DirectionBindings {
    fn default() -> Self {
        Self {
            up: KeyCode::KeyW,
            down: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
        }
    }
}

// ── CameraUniform ────────────────────────────────────────────────────────────

/// Camera matrix uploaded to the GPU by the external render backend.
///
/// Layout (column-major, matching WGSL `mat4x4<f32>`):
/// ```text
/// col0: [sx,  0,   0,  0]
/// col1: [0,   sy,  0,  0]
/// col2: [0,   0,   1,  0]
/// col3: [tx,  ty,  0,  1]
/// ```
/// where `sx = 2/w`, `sy = -2/h`, `tx = -sx*cx`, `ty = -sy*cy`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Column-major 4×4 view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

// ── Camera2D ─────────────────────────────────────────────────────────────────

/// 2D viewport transform moved by directional input.
///
/// Exactly one camera is registered as active by the surrounding engine;
/// rendering without one is that layer's fatal precondition. This core only
/// supplies position and viewport state.
pub struct Camera2D {
    pub name: String,
    /// World-space pixel position the camera is centered on.
    pub position: Vec2,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Pan speed in world pixels per second.
    pub speed: f32,
    pub bindings: DirectionBindings,
}

impl Camera2D {
    pub fn new(name: &str, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            name: name.to_string(),
            position: Vec2::ZERO,
            viewport_width,
            viewport_height,
            speed: DEFAULT_CAMERA_SPEED,
            bindings: DirectionBindings::default(),
        }
    }

    /// Move the camera from the currently-held direction keys.
    ///
    /// Each axis is scaled independently by `speed * dt`: opposing keys net
    /// to zero on that axis, and orthogonal keys combine unnormalised, so
    /// diagonal movement is faster than axis-aligned movement.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        let mut direction = Vec2::ZERO;
        if input.is_key_held(self.bindings.up) {
            direction.y -= 1.0;
        }
        if input.is_key_held(self.bindings.down) {
            direction.y += 1.0;
        }
        if input.is_key_held(self.bindings.left) {
            direction.x -= 1.0;
        }
        if input.is_key_held(self.bindings.right) {
            direction.x += 1.0;
        }
        self.position += direction * self.speed * dt;
    }

    /// Build the view-projection matrix for the current position and
    /// viewport, mapping world-space pixels so that `position` lands at
    /// screen center.
    ///
    /// Derivation (y-down pixel space → NDC):
    /// ```text
    /// x_ndc = sx * world_x + tx    (sx = 2/w,  tx = -sx*cx)
    /// y_ndc = sy * world_y + ty    (sy = -2/h, ty = -sy*cy)
    /// ```
    pub fn view_proj(&self) -> CameraUniform {
        let (cx, cy) = (self.position.x, self.position.y);
        let sx = 2.0 / self.viewport_width;
        let sy = -2.0 / self.viewport_height;
        let tx = -sx * cx;
        let ty = -sy * cy;

        CameraUniform {
            view_proj: [
                [sx, 0.0, 0.0, 0.0],  // col0
                [0.0, sy, 0.0, 0.0],  // col1
                [0.0, 0.0, 1.0, 0.0], // col2
                [tx, ty, 0.0, 1.0],   // col3
            ],
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
