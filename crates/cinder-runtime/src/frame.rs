//! Per-frame inputs handed to simulation systems

use cinder_core::Vec3;

/// Everything a system reads from its environment for one frame.
///
/// Camera and input handling live outside the engine; the host fills this
/// in from whatever it tracks and passes it down explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Unit view direction, used as the depth reference for sorting
    pub view_direction: Vec3,
    /// Viewer position, used by viewer-anchored emitters
    pub eye: Vec3,
    /// Emit signal (e.g. a held key) gating gated emitters
    pub emit: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            dt: 0.0,
            view_direction: Vec3::FORWARD,
            eye: Vec3::ZERO,
            emit: false,
        }
    }
}

impl FrameContext {
    pub fn new(dt: f32, view_direction: Vec3) -> Self {
        Self {
            dt,
            view_direction,
            ..Default::default()
        }
    }

    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    pub fn with_emit(mut self, emit: bool) -> Self {
        self.emit = emit;
        self
    }
}
