//! Per-frame particle integration

use crate::curves::life_blend;
use crate::emitter::toml_f32;
use crate::particle::{Particle, ParticleKind};
use cinder_core::{CinderError, Result, Vec3};

/// Motion policy for galaxy particles.
///
/// During the swirl phase particles orbit the Y axis, faster near the
/// center, while slowly falling inward and drifting toward the `y = r`
/// surface. All rates grow with elapsed time. After the swirl phase each
/// particle flies off ballistically once its remaining life drops below
/// `elapsed² - release_offset`, so the release is staggered by age.
///
/// Color drifts during the swirl as well: red and green climb toward 1 and
/// blue settles on `blue_target`, each moving `dt / color_period` per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyMotion {
    pub swirl_duration: f32,
    pub release_offset: f32,
    pub spin_strength: f32,
    pub spin_ramp: f32,
    pub inward_speed: f32,
    pub inward_decay: f32,
    pub inward_strength: f32,
    pub lift: f32,
    pub lift_ramp: f32,
    pub color_period: f32,
    pub blue_target: f32,
}

impl Default for GalaxyMotion {
    fn default() -> Self {
        Self {
            swirl_duration: 88.0,
            release_offset: 8070.0,
            spin_strength: 5.0,
            spin_ramp: 20.0,
            inward_speed: 0.1,
            inward_decay: 0.1,
            inward_strength: 3.0,
            lift: 0.15,
            lift_ramp: 15.0,
            color_period: 88.0,
            blue_target: 0.4,
        }
    }
}

impl GalaxyMotion {
    /// Overlay a `[galaxy]` TOML table onto `self`
    pub fn apply_toml(&mut self, table: &toml::value::Table) -> Result<()> {
        let fields: [(&str, &mut f32); 11] = [
            ("swirl_duration", &mut self.swirl_duration),
            ("release_offset", &mut self.release_offset),
            ("spin_strength", &mut self.spin_strength),
            ("spin_ramp", &mut self.spin_ramp),
            ("inward_speed", &mut self.inward_speed),
            ("inward_decay", &mut self.inward_decay),
            ("inward_strength", &mut self.inward_strength),
            ("lift", &mut self.lift),
            ("lift_ramp", &mut self.lift_ramp),
            ("color_period", &mut self.color_period),
            ("blue_target", &mut self.blue_target),
        ];
        for (key, field) in fields {
            if let Some(v) = table.get(key) {
                *field = toml_f32(v, *field);
            }
        }
        if !(self.spin_ramp > 0.0 && self.lift_ramp > 0.0 && self.color_period > 0.0) {
            return Err(CinderError::InvalidConfig(
                "galaxy spin_ramp, lift_ramp and color_period must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn advance(&self, p: &mut Particle, dt: f32, elapsed: f32) {
        if elapsed < self.swirl_duration {
            let pos = p.position;
            let mut r = (pos.x * pos.x + pos.z * pos.z).sqrt();
            let mut theta = pos.z.atan2(pos.x);

            let ramp = elapsed / self.spin_ramp;
            let spin = self.spin_strength / (r * r + 1.0) * ramp;
            let pull = self.inward_strength / (r + 1.0) * ramp;

            theta += dt * spin;
            r -= dt * self.inward_speed * (-self.inward_decay * theta).exp() * pull;

            let lift = self.lift * elapsed / self.lift_ramp;
            let y = pos.y + (r - pos.y) * dt * lift;

            p.position = Vec3::new(r * theta.cos(), y, r * theta.sin());
            self.drift_color(p, dt);
        } else if p.life < elapsed * elapsed - self.release_offset {
            p.position += p.velocity * dt;
        }
    }

    fn drift_color(&self, p: &mut Particle, dt: f32) {
        let step = dt / self.color_period;
        if p.color.r < 1.0 {
            p.color.r += step;
        }
        if p.color.g < 1.0 {
            p.color.g += step;
        }
        if p.color.b < self.blue_target {
            p.color.b += step;
        } else {
            p.color.b -= step;
        }
    }
}

/// Advances particle state by one frame
#[derive(Debug, Clone)]
pub struct Integrator {
    pub gravity: Vec3,
    pub galaxy: GalaxyMotion,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            galaxy: GalaxyMotion::default(),
        }
    }
}

impl Integrator {
    pub fn new(gravity: Vec3, galaxy: GalaxyMotion) -> Self {
        Self { gravity, galaxy }
    }

    /// Step every live slot by `dt`. Returns the number of slots that were
    /// live going in, which includes particles that expire during this step.
    pub fn step(
        &self,
        particles: &mut [Particle],
        dt: f32,
        view_direction: Vec3,
        elapsed: f32,
    ) -> usize {
        let mut live = 0;
        for p in particles.iter_mut() {
            if !p.is_alive() {
                continue;
            }
            live += 1;

            p.life -= dt;
            if !p.is_alive() {
                p.view_distance = f32::NEG_INFINITY;
                continue;
            }

            match p.kind {
                // Galaxy color is driven by the swirl, not by remaining life
                ParticleKind::Galaxy => self.galaxy.advance(p, dt, elapsed),
                kind => {
                    if kind.has_gravity() {
                        p.velocity += self.gravity * dt;
                    }
                    p.position += p.velocity * dt;
                    p.color = life_blend(p.color_start, p.color_end, p.life_ratio());
                }
            }

            p.view_distance = p.position.dot(&view_direction);
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::Color;

    fn particle(kind: ParticleKind, life: f32) -> Particle {
        Particle {
            velocity: Vec3::new(1.0, 0.0, 0.0),
            color_start: Color::new(1.0, 0.5, 0.0, 1.0),
            color_end: Color::new(0.0, 0.0, 0.0, 0.0),
            life,
            max_life: life,
            kind,
            ..Particle::dead()
        }
    }

    #[test]
    fn counts_live_slots_before_decrement() {
        let integrator = Integrator::default();
        let mut particles = vec![
            particle(ParticleKind::Fire, 1.0),
            particle(ParticleKind::Fire, 0.05),
            Particle::dead(),
        ];
        let live = integrator.step(&mut particles, 0.1, Vec3::FORWARD, 0.1);
        assert_eq!(live, 2);

        // The short-lived one expired this step
        assert!(particles[1].is_free());
        assert_eq!(particles[1].view_distance, f32::NEG_INFINITY);

        let live = integrator.step(&mut particles, 0.1, Vec3::FORWARD, 0.2);
        assert_eq!(live, 1);
    }

    #[test]
    fn life_decreases_by_dt_each_frame() {
        let integrator = Integrator::default();
        let mut particles = vec![particle(ParticleKind::Fire, 1.0)];
        let mut previous = particles[0].life;
        for frame in 1..=9 {
            integrator.step(&mut particles, 0.1, Vec3::FORWARD, frame as f32 * 0.1);
            let life = particles[0].life;
            assert!(life < previous);
            assert!((previous - life - 0.1).abs() < 1e-5);
            previous = life;
        }
    }

    #[test]
    fn forward_euler_without_gravity_for_fire() {
        let integrator = Integrator::default();
        let mut particles = vec![particle(ParticleKind::Fire, 2.0)];
        integrator.step(&mut particles, 0.5, Vec3::FORWARD, 0.5);
        assert_eq!(particles[0].velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(particles[0].position, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn liquid_falls_under_gravity() {
        let integrator = Integrator::default();
        let mut particles = vec![particle(ParticleKind::Liquid, 2.0)];
        integrator.step(&mut particles, 0.5, Vec3::FORWARD, 0.5);
        let p = &particles[0];
        assert!((p.velocity.y + 4.9).abs() < 1e-5);
        // Velocity is updated before position
        assert!((p.position.y + 2.45).abs() < 1e-5);
    }

    #[test]
    fn color_blends_toward_end() {
        let integrator = Integrator::default();
        let mut particles = vec![particle(ParticleKind::Fire, 1.0)];
        integrator.step(&mut particles, 0.5, Vec3::FORWARD, 0.5);
        let c = particles[0].color;
        assert!((c.r - 0.5).abs() < 1e-5);
        assert!((c.g - 0.25).abs() < 1e-5);
        assert!((c.a - 0.5).abs() < 1e-5);

        integrator.step(&mut particles, 0.4999, Vec3::FORWARD, 1.0);
        let c = particles[0].color;
        assert!(c.r < 1e-3 && c.a < 1e-3);
    }

    #[test]
    fn view_distance_is_projection() {
        let integrator = Integrator::default();
        let mut p = particle(ParticleKind::Fire, 2.0);
        p.position = Vec3::new(0.0, 0.0, -4.0);
        p.velocity = Vec3::ZERO;
        let mut particles = vec![p];
        integrator.step(&mut particles, 0.1, Vec3::FORWARD, 0.1);
        assert!((particles[0].view_distance - 4.0).abs() < 1e-6);
    }

    #[test]
    fn galaxy_swirls_about_y_axis() {
        let motion = GalaxyMotion::default();
        let mut p = particle(ParticleKind::Galaxy, 100.0);
        p.position = Vec3::new(2.0, 0.0, 0.0);
        motion.advance(&mut p, 0.1, 10.0);

        // Moved counter-clockwise in the XZ plane, pulled slightly inward
        assert!(p.position.z > 0.0);
        let r = (p.position.x * p.position.x + p.position.z * p.position.z).sqrt();
        assert!(r < 2.0 && r > 1.9);
        // Lifted toward y = r
        assert!(p.position.y > 0.0);
    }

    #[test]
    fn galaxy_color_drifts_during_swirl() {
        let integrator = Integrator::default();
        let mut p = particle(ParticleKind::Galaxy, 100.0);
        p.position = Vec3::new(2.0, 0.0, 0.0);
        p.color = Color::new(0.2, 1.0, 0.9, 0.6);
        let mut particles = vec![p];
        integrator.step(&mut particles, 0.88, Vec3::FORWARD, 10.0);

        let c = particles[0].color;
        // One step is 0.88 / 88 = 0.01
        assert!((c.r - 0.21).abs() < 1e-5);
        assert!((c.g - 1.0).abs() < 1e-6);
        assert!((c.b - 0.89).abs() < 1e-5);
        assert!((c.a - 0.6).abs() < 1e-6);
    }

    #[test]
    fn galaxy_blue_settles_on_target() {
        let motion = GalaxyMotion::default();
        let mut p = particle(ParticleKind::Galaxy, 100.0);
        p.position = Vec3::new(1.0, 0.0, 1.0);
        p.color = Color::new(0.0, 0.0, 0.0, 1.0);
        for _ in 0..2000 {
            motion.advance(&mut p, 0.1, 20.0);
        }
        assert!((p.color.b - 0.4).abs() < 0.01);
        assert!(p.color.r >= 1.0 && p.color.r < 1.01);
    }

    #[test]
    fn galaxy_color_holds_after_swirl() {
        let motion = GalaxyMotion::default();
        let mut p = particle(ParticleKind::Galaxy, 60.0);
        p.color = Color::new(0.1, 0.2, 0.3, 0.4);
        motion.advance(&mut p, 0.1, 90.0);
        assert_eq!(p.color, Color::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn galaxy_release_is_staggered_by_life() {
        let motion = GalaxyMotion::default();
        // elapsed 90 => threshold 8100 - 8070 = 30
        let mut young = particle(ParticleKind::Galaxy, 60.0);
        let mut old = particle(ParticleKind::Galaxy, 10.0);
        motion.advance(&mut young, 0.1, 90.0);
        motion.advance(&mut old, 0.1, 90.0);
        assert_eq!(young.position, Vec3::ZERO);
        assert!((old.position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn galaxy_toml_overlay() {
        let table: toml::value::Table =
            toml::from_str("swirl_duration = 30\nrelease_offset = 800\nblue_target = 0.5").unwrap();
        let mut motion = GalaxyMotion::default();
        motion.apply_toml(&table).unwrap();
        assert_eq!(motion.swirl_duration, 30.0);
        assert_eq!(motion.release_offset, 800.0);
        assert_eq!(motion.blue_target, 0.5);
        assert_eq!(motion.color_period, 88.0);

        let table: toml::value::Table = toml::from_str("spin_ramp = 0").unwrap();
        assert!(motion.apply_toml(&table).is_err());
    }
}
