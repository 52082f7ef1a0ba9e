//! The frame-stepped particle simulation

use crate::collision::{CollisionResolver, CollisionStats};
use crate::config::SimulationConfig;
use crate::emitter::{Emitter, EmitterSet};
use crate::integrate::Integrator;
use crate::output::FrameOutput;
use crate::particle::ParticlePool;
use crate::rand::{ParticleRng, RandomSource};
use crate::sort::sort_back_to_front;
use cinder_core::Result;
use cinder_runtime::FrameContext;

/// Counters describing the most recent frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed: f32,
    pub num_live: usize,
    pub spawned: usize,
    pub bounces: usize,
    pub extinguished: usize,
    /// Emitters in the set after spreading
    pub emitters: usize,
}

/// Owns the pool, the emitters and the output buffers, and advances them
/// one frame at a time.
///
/// Each frame runs: spread, emit, integrate, collide, sort, fill output.
pub struct ParticleSimulation {
    pool: ParticlePool,
    emitters: EmitterSet,
    integrator: Integrator,
    collisions: Option<CollisionResolver>,
    sort: bool,
    output: FrameOutput,
    /// Slots live going into integration; only kept when not sorting
    live_slots: Vec<usize>,
    rng: Box<dyn RandomSource>,
    elapsed: f32,
    stats: FrameStats,
}

impl ParticleSimulation {
    /// Build a simulation seeded from `config.seed`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = Box::new(ParticleRng::new(config.seed));
        Self::with_rng(config, rng)
    }

    /// Build a simulation drawing from a caller-supplied random source
    pub fn with_rng(config: SimulationConfig, rng: Box<dyn RandomSource>) -> Result<Self> {
        config.validate()?;
        let pool = ParticlePool::new(config.capacity)?;
        let collisions = config.collision.map(CollisionResolver::new).transpose()?;
        let emitters = EmitterSet::new(
            config.emitters.into_iter().map(Emitter::new).collect(),
            config.spread,
        );
        log::debug!(
            "[particles] simulation ready: {} slots, {} emitter(s)",
            config.capacity,
            emitters.len()
        );

        Ok(Self {
            pool,
            emitters,
            integrator: Integrator::new(config.gravity, config.galaxy),
            collisions,
            sort: config.sort,
            output: FrameOutput::with_capacity(config.capacity),
            live_slots: Vec::new(),
            rng,
            elapsed: 0.0,
            stats: FrameStats::default(),
        })
    }

    /// Advance one frame and return the arrays to draw
    pub fn simulate(&mut self, frame: &FrameContext) -> &FrameOutput {
        let dt = frame.dt;
        self.elapsed += dt;
        let rng = self.rng.as_mut();

        self.emitters.spread(dt, rng);
        let spawned = self.emitters.emit(&mut self.pool, frame, self.elapsed, rng);

        if !self.sort {
            self.live_slots.clear();
            self.live_slots.extend(
                self.pool
                    .slots()
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_alive())
                    .map(|(i, _)| i),
            );
        }
        let num_live = self.integrator.step(
            self.pool.slots_mut(),
            dt,
            frame.view_direction,
            self.elapsed,
        );

        let collided = match &self.collisions {
            Some(resolver) => resolver.apply(
                self.pool.slots_mut(),
                self.emitters.emitters_mut(),
                frame.view_direction,
                rng,
            ),
            None => CollisionStats::default(),
        };

        if self.sort {
            sort_back_to_front(self.pool.slots_mut());
            self.output.fill(self.pool.slots(), num_live);
        } else {
            self.output.fill_slots(self.pool.slots(), &self.live_slots);
        }

        self.stats = FrameStats {
            frame: self.stats.frame + 1,
            elapsed: self.elapsed,
            num_live,
            spawned,
            bounces: collided.bounces,
            extinguished: collided.extinguished,
            emitters: self.emitters.len(),
        };
        &self.output
    }

    /// Output of the most recent frame
    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Simulated seconds since construction
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn emitters(&self) -> &[Emitter] {
        self.emitters.emitters()
    }

    /// Add an emitter at runtime, e.g. when a host places a new fire
    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionConfig;
    use crate::emitter::EmitterConfig;
    use crate::particle::ParticleKind;
    use crate::rand::SequenceRng;
    use cinder_core::Vec3;

    fn frame(dt: f32) -> FrameContext {
        FrameContext::new(dt, Vec3::FORWARD)
    }

    fn single_emitter(capacity: usize, emitter: EmitterConfig) -> SimulationConfig {
        SimulationConfig {
            capacity,
            emitters: vec![emitter],
            ..Default::default()
        }
    }

    #[test]
    fn saturates_at_capacity_and_stays() {
        let emitter = EmitterConfig {
            emission_rate: 100.0,
            lifetime: 2.0,
            ..Default::default()
        };
        let mut sim = ParticleSimulation::new(single_emitter(10, emitter)).unwrap();

        for i in 1..=10 {
            let live = sim.simulate(&frame(0.1)).num_live();
            assert_eq!(live, 10, "frame {i}");
            assert_eq!(sim.output().positions().len(), 10);
            assert_eq!(sim.output().colors().len(), 10);
        }
        assert_eq!(sim.stats().frame, 10);
        assert!((sim.elapsed() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn live_count_never_exceeds_capacity() {
        let config = SimulationConfig {
            capacity: 200,
            seed: 17,
            ..SimulationConfig::fire()
        };
        let mut sim = ParticleSimulation::new(config).unwrap();
        let ctx = FrameContext::new(1.0 / 30.0, Vec3::new(0.3, -0.2, -1.0).normalized())
            .with_eye(Vec3::new(0.0, 1.0, 5.0))
            .with_emit(true);
        for _ in 0..300 {
            let live = sim.simulate(&ctx).num_live();
            assert!(live <= 200);
            assert!(sim.pool().live_count() <= 200);
        }
    }

    #[test]
    fn expired_particles_leave_the_next_frame() {
        let emitter = EmitterConfig {
            emission_rate: 10.0,
            lifetime: 0.15,
            gated: true,
            ..Default::default()
        };
        let rng = Box::new(SequenceRng::constant(0.5));
        let mut sim = ParticleSimulation::with_rng(single_emitter(4, emitter), rng).unwrap();

        assert_eq!(sim.simulate(&frame(0.1).with_emit(true)).num_live(), 1);
        assert_eq!(sim.stats().spawned, 1);
        // Expires during this frame but was live going in
        assert_eq!(sim.simulate(&frame(0.1)).num_live(), 1);
        assert_eq!(sim.pool().live_count(), 0);
        assert_eq!(sim.simulate(&frame(0.1)).num_live(), 0);
    }

    #[test]
    fn unsorted_count_includes_particles_expiring_this_frame() {
        let emitter = EmitterConfig {
            emission_rate: 10.0,
            lifetime: 0.15,
            gated: true,
            ..Default::default()
        };
        let config = SimulationConfig {
            sort: false,
            ..single_emitter(4, emitter)
        };
        let rng = Box::new(SequenceRng::constant(0.5));
        let mut sim = ParticleSimulation::with_rng(config, rng).unwrap();

        assert_eq!(sim.simulate(&frame(0.1).with_emit(true)).num_live(), 1);
        assert_eq!(sim.simulate(&frame(0.1)).num_live(), 1);
        assert_eq!(sim.pool().live_count(), 0);
        assert_eq!(sim.stats().num_live, 1);
        assert_eq!(sim.simulate(&frame(0.1)).num_live(), 0);
    }

    #[test]
    fn sort_flag_does_not_change_live_count() {
        let run = |sort: bool| {
            let config = SimulationConfig {
                capacity: 400,
                seed: 11,
                sort,
                collision: None,
                spread: None,
                ..SimulationConfig::fire()
            };
            let mut sim = ParticleSimulation::new(config).unwrap();
            let ctx = frame(0.05).with_emit(true);
            (0..80)
                .map(|_| sim.simulate(&ctx).num_live())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn output_is_sorted_back_to_front() {
        let config = SimulationConfig {
            capacity: 500,
            seed: 3,
            collision: None,
            spread: None,
            ..SimulationConfig::fire()
        };
        let mut sim = ParticleSimulation::new(config).unwrap();
        for _ in 0..20 {
            sim.simulate(&frame(0.05));
        }
        let slots = sim.pool().slots();
        let n = sim.output().num_live();
        assert!(n > 0);
        for pair in slots[..n].windows(2) {
            assert!(pair[0].view_distance >= pair[1].view_distance);
        }
    }

    #[test]
    fn water_douses_fire() {
        let fire_site = Vec3::new(0.0, -0.5, 0.0);
        let pour = EmitterConfig {
            kind: ParticleKind::Liquid,
            position: fire_site,
            velocity: Vec3::ZERO,
            emission_rate: 100.0,
            ..Default::default()
        };
        let config = SimulationConfig {
            capacity: 1000,
            emitters: vec![EmitterConfig::fire(fire_site), pour],
            collision: Some(CollisionConfig {
                obstacle: None,
                damping_per_hit: 0.25,
                ..Default::default()
            }),
            ..Default::default()
        };
        let rng = Box::new(SequenceRng::constant(0.5));
        let mut sim = ParticleSimulation::with_rng(config, rng).unwrap();

        sim.simulate(&frame(0.1));
        assert_eq!(sim.stats().extinguished, 4);
        assert!(sim.emitters()[0].is_doused());

        let burning = |sim: &ParticleSimulation| {
            sim.pool()
                .slots()
                .iter()
                .filter(|p| p.is_alive() && p.kind == ParticleKind::Fire)
                .count()
        };
        let before = burning(&sim);
        assert_eq!(before, 5);
        for _ in 0..5 {
            sim.simulate(&frame(0.1));
        }
        assert_eq!(burning(&sim), before);
    }

    #[test]
    fn unsorted_output_lists_live_particles() {
        let mut sim = ParticleSimulation::new(SimulationConfig {
            capacity: 5000,
            ..SimulationConfig::galaxy()
        })
        .unwrap();
        for _ in 0..30 {
            sim.simulate(&frame(0.1));
        }
        assert_eq!(sim.output().num_live(), sim.pool().live_count());
        assert!(sim.output().num_live() > 0);
    }

    #[test]
    fn same_seed_same_frames() {
        let run = || {
            let mut sim = ParticleSimulation::new(SimulationConfig {
                capacity: 300,
                seed: 42,
                ..SimulationConfig::fire()
            })
            .unwrap();
            let ctx = frame(0.02).with_emit(true);
            for _ in 0..50 {
                sim.simulate(&ctx);
            }
            sim.output().position_bytes().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = SimulationConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(ParticleSimulation::new(config).is_err());
    }
}
