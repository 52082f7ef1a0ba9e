//! Particle records and the fixed-capacity pool that owns them

use cinder_core::{CinderError, Color, Result, Vec3};

/// Which physics and collision rules apply to a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    /// Flames, sparks and smoke: ballistic, no gravity, no collisions
    #[default]
    Fire,
    /// Water: falls under gravity, bounces off the world, douses fires
    Liquid,
    /// Free-flowing galaxy particles driven by the swirl motion
    Galaxy,
}

impl ParticleKind {
    pub const NAMES: [&'static str; 3] = ["fire", "liquid", "galaxy"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fire" => Some(ParticleKind::Fire),
            "liquid" | "water" => Some(ParticleKind::Liquid),
            "galaxy" => Some(ParticleKind::Galaxy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleKind::Fire => "fire",
            ParticleKind::Liquid => "liquid",
            ParticleKind::Galaxy => "galaxy",
        }
    }

    pub fn has_gravity(&self) -> bool {
        matches!(self, ParticleKind::Liquid)
    }

    pub fn collides(&self) -> bool {
        matches!(self, ParticleKind::Liquid)
    }
}

/// CPU-side particle state
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Color,
    pub color_start: Color,
    pub color_end: Color,
    pub size: f32,
    /// Remaining life in seconds; a slot is free once this is not positive
    pub life: f32,
    pub max_life: f32,
    /// Projection of `position` onto the view direction; `-inf` when dead
    pub view_distance: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: Color::TRANSPARENT,
            color_start: Color::TRANSPARENT,
            color_end: Color::TRANSPARENT,
            size: 0.0,
            life: -1.0,
            max_life: 0.0,
            view_distance: f32::NEG_INFINITY,
            kind: ParticleKind::Fire,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Free slots are reusable by the allocator
    pub fn is_free(&self) -> bool {
        !self.is_alive()
    }

    /// Free this slot immediately
    pub fn kill(&mut self) {
        self.life = -1.0;
        self.view_distance = f32::NEG_INFINITY;
    }

    /// Fraction of life remaining, in [0, 1]
    pub fn life_ratio(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Fixed-capacity arena of particles addressed by slot index.
///
/// Liveness lives on the record itself, so allocation is a search for a
/// free record. The search resumes from the last slot handed out and wraps
/// around, which keeps emission cheap when the pool is mostly full.
pub struct ParticlePool {
    particles: Vec<Particle>,
    next_free: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CinderError::InvalidConfig(
                "particle pool capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            particles: vec![Particle::dead(); capacity],
            next_free: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Where the next free-slot search starts
    pub fn next_free_hint(&self) -> usize {
        self.next_free
    }

    /// Find a free slot, or `None` if every slot is live.
    /// The returned slot's contents are stale until the caller writes them.
    pub fn allocate_slot(&mut self) -> Option<usize> {
        let start = self.next_free;
        let found = (start..self.particles.len())
            .chain(0..start)
            .find(|&i| self.particles[i].is_free())?;
        self.next_free = found;
        Some(found)
    }

    /// Allocate a slot and return it for initialization
    pub fn spawn(&mut self) -> Option<&mut Particle> {
        let idx = self.allocate_slot()?;
        Some(&mut self.particles[idx])
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Every slot, live or free
    pub fn slots(&self) -> &[Particle] {
        &self.particles
    }

    pub fn slots_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of live slots
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Free every slot
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.kill();
        }
        self.next_free = 0;
    }
}
