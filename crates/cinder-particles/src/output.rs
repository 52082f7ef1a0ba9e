//! Per-frame output consumed by the renderer

use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};

/// World position plus billboard size, 16 bytes.
/// Matches a `vec4` vertex attribute: xyz = position, w = size.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PositionSize {
    pub position: [f32; 3],
    pub size: f32,
}

impl PositionSize {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
        }
    }
}

/// The arrays handed to the renderer each frame, index-aligned and
/// `num_live` long. Storage is reused from frame to frame.
#[derive(Debug, Default)]
pub struct FrameOutput {
    num_live: usize,
    positions: Vec<PositionSize>,
    colors: Vec<[f32; 4]>,
}

impl FrameOutput {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            num_live: 0,
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    /// Copy the first `num_live` slots of the (sorted) pool
    pub fn fill(&mut self, particles: &[Particle], num_live: usize) {
        let count = num_live.min(particles.len());
        self.num_live = count;
        self.positions.clear();
        self.colors.clear();
        for p in &particles[..count] {
            self.positions.push(PositionSize::from_particle(p));
            self.colors.push(p.color.to_array());
        }
    }

    /// Copy the listed slots in the given order. Used when the pool is not
    /// sorted, so the frame's particles are scattered rather than a prefix.
    pub fn fill_slots(&mut self, particles: &[Particle], slots: &[usize]) {
        self.positions.clear();
        self.colors.clear();
        for p in slots.iter().filter_map(|&i| particles.get(i)) {
            self.positions.push(PositionSize::from_particle(p));
            self.colors.push(p.color.to_array());
        }
        self.num_live = self.positions.len();
    }

    pub fn num_live(&self) -> usize {
        self.num_live
    }

    pub fn positions(&self) -> &[PositionSize] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// Position/size array as raw bytes for a vertex buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Color array as raw bytes for a vertex buffer upload
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}
