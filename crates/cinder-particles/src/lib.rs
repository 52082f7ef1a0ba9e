//! Cinder Particles - pooled particle simulation
//!
//! Provides a fixed-capacity particle simulation with:
//! - Arena pool with a wrapping free-slot hint, no allocation after startup
//! - Rate-based emitters with box volumes, spray arcs, and color/size jitter
//! - Forward-Euler integration with kind-tagged behaviour (fire, liquid, galaxy)
//! - Liquid collisions against world bounds and a bowl, dousing fires on contact
//! - Back-to-front sorting and `Pod` output arrays ready for instanced drawing

pub mod collision;
pub mod config;
pub mod curves;
pub mod emitter;
pub mod integrate;
pub mod output;
pub mod particle;
pub mod rand;
pub mod simulation;
pub mod sort;
pub mod spread;

use cinder_core::Result;
use cinder_runtime::{FrameContext, RuntimeSystem};

pub use collision::{
    CollisionConfig, CollisionResolver, CollisionStats, SphereObstacle, WorldBounds,
};
pub use config::SimulationConfig;
pub use emitter::{Emitter, EmitterAnchor, EmitterConfig, EmitterSet};
pub use integrate::{GalaxyMotion, Integrator};
pub use output::{FrameOutput, PositionSize};
pub use particle::{Particle, ParticleKind, ParticlePool};
pub use rand::{ParticleRng, RandomSource, SequenceRng, SprayOrder};
pub use simulation::{FrameStats, ParticleSimulation};
pub use spread::SpreadRule;

/// The particle system — implements RuntimeSystem for integration with the game loop.
pub struct ParticleSystem {
    pub simulation: ParticleSimulation,
}

impl ParticleSystem {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self {
            simulation: ParticleSimulation::new(config)?,
        })
    }

    /// Output of the most recent update
    pub fn output(&self) -> &FrameOutput {
        self.simulation.output()
    }
}

impl RuntimeSystem for ParticleSystem {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[particles] {} slot(s), {} emitter(s)",
            self.simulation.pool().capacity(),
            self.simulation.emitters().len()
        );
        Ok(())
    }

    fn update(&mut self, frame: &FrameContext) -> Result<()> {
        self.simulation.simulate(frame);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}
