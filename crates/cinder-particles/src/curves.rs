//! Value-over-lifetime blending

use cinder_core::Color;

/// Color for a particle with `t` of its life remaining (`1` fresh, `0` spent):
/// `t * start + (1 - t) * end`.
pub fn life_blend(start: Color, end: Color, t: f32) -> Color {
    start * t + end * (1.0 - t)
}
