//! Liquid particle collisions against the room, the grill bowl, and fires

use crate::emitter::{toml_f32, toml_vec3, Emitter};
use crate::particle::Particle;
use crate::rand::RandomSource;
use cinder_core::{CinderError, Result, Vec3};

/// Axis-aligned box bounding the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-7.5, -1.0, -7.5),
            max: Vec3::new(7.5, 5.0, 7.5),
        }
    }
}

impl WorldBounds {
    pub fn validate(&self) -> Result<()> {
        for axis in 0..3 {
            if self.min[axis] > self.max[axis] {
                return Err(CinderError::InvalidConfig(format!(
                    "world bounds are inverted on axis {axis}"
                )));
            }
        }
        Ok(())
    }

    /// Strictly inside on the horizontal (X/Z) axes
    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.z > self.min.z && p.z < self.max.z
    }
}

/// A bowl: the lower hemisphere of a sphere, open at the center height.
/// Particles landing near the rim bounce off it like a floor; particles
/// entering through the curved side reflect off the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereObstacle {
    pub center: Vec3,
    pub radius: f32,
    /// Depth below the rim that still counts as landing on top
    pub rim_tolerance: f32,
}

impl Default for SphereObstacle {
    fn default() -> Self {
        Self {
            center: Vec3::new(2.0, 0.0, 2.0),
            radius: 1.0,
            rim_tolerance: 0.05,
        }
    }
}

/// Tunables for collision response
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    pub bounds: WorldBounds,
    pub obstacle: Option<SphereObstacle>,
    /// Fraction of the normal speed kept after a bounce
    pub restitution: f32,
    /// Half-width of the random velocity kick added on impact
    pub jitter: f32,
    pub extinguish_radius: f32,
    /// Damping added to a fire emitter per liquid particle absorbed
    pub damping_per_hit: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            obstacle: Some(SphereObstacle::default()),
            restitution: 0.5,
            jitter: 1.0,
            extinguish_radius: 1.0,
            damping_per_hit: 0.001,
        }
    }
}

impl CollisionConfig {
    /// Overlay a `[collision]` TOML table onto `self`
    pub fn apply_toml(&mut self, table: &toml::value::Table) -> Result<()> {
        if let Some(v) = table.get("bounds_min") {
            self.bounds.min = toml_vec3(v, self.bounds.min);
        }
        if let Some(v) = table.get("bounds_max") {
            self.bounds.max = toml_vec3(v, self.bounds.max);
        }
        if let Some(v) = table.get("restitution") {
            self.restitution = toml_f32(v, self.restitution);
        }
        if let Some(v) = table.get("jitter") {
            self.jitter = toml_f32(v, self.jitter);
        }
        if let Some(v) = table.get("extinguish_radius") {
            self.extinguish_radius = toml_f32(v, self.extinguish_radius);
        }
        if let Some(v) = table.get("damping_per_hit") {
            self.damping_per_hit = toml_f32(v, self.damping_per_hit);
        }
        match table.get("obstacle") {
            Some(toml::Value::Table(obstacle)) => {
                let mut sphere = self.obstacle.unwrap_or_default();
                if let Some(v) = obstacle.get("center") {
                    sphere.center = toml_vec3(v, sphere.center);
                }
                if let Some(v) = obstacle.get("radius") {
                    sphere.radius = toml_f32(v, sphere.radius);
                }
                if let Some(v) = obstacle.get("rim_tolerance") {
                    sphere.rim_tolerance = toml_f32(v, sphere.rim_tolerance);
                }
                self.obstacle = Some(sphere);
            }
            Some(toml::Value::Boolean(false)) => self.obstacle = None,
            _ => {}
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(CinderError::out_of_range(
                "restitution",
                0.0,
                1.0,
                self.restitution as f64,
            ));
        }
        if self.jitter < 0.0 || self.extinguish_radius < 0.0 || self.damping_per_hit < 0.0 {
            return Err(CinderError::InvalidConfig(
                "collision jitter, extinguish radius and damping per hit must not be negative"
                    .to_string(),
            ));
        }
        if let Some(sphere) = &self.obstacle {
            if !(sphere.radius > 0.0) {
                return Err(CinderError::InvalidConfig(format!(
                    "obstacle radius must be positive, got {}",
                    sphere.radius
                )));
            }
        }
        Ok(())
    }
}

/// Per-frame collision counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub bounces: usize,
    pub extinguished: usize,
}

/// Resolves liquid particle contacts
pub struct CollisionResolver {
    config: CollisionConfig,
}

impl CollisionResolver {
    pub fn new(config: CollisionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Resolve every live liquid particle against the world and the fires
    pub fn apply(
        &self,
        particles: &mut [Particle],
        emitters: &mut [Emitter],
        view_direction: Vec3,
        rng: &mut dyn RandomSource,
    ) -> CollisionStats {
        let mut stats = CollisionStats::default();
        for p in particles.iter_mut() {
            if !p.is_alive() || !p.kind.collides() {
                continue;
            }
            if self.resolve_geometry(p, view_direction, rng) {
                stats.bounces += 1;
            }
            if self.extinguish(p, emitters) {
                stats.extinguished += 1;
            }
        }
        stats
    }

    /// Bounce `p` off the world bounds and the obstacle. Returns whether
    /// anything was hit.
    pub fn resolve_geometry(
        &self,
        p: &mut Particle,
        view_direction: Vec3,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let restitution = self.config.restitution;
        let bounds = &self.config.bounds;
        let mut collided = false;

        for axis in 0..3 {
            if p.position[axis] < bounds.min[axis] {
                p.position[axis] = bounds.min[axis];
                p.velocity[axis] = -p.velocity[axis] * restitution;
                collided = true;
            } else if p.position[axis] > bounds.max[axis] {
                p.position[axis] = bounds.max[axis];
                p.velocity[axis] = -p.velocity[axis] * restitution;
                collided = true;
            }
        }

        if let Some(sphere) = &self.config.obstacle {
            if p.position.y < sphere.center.y {
                let offset = p.position - sphere.center;
                if offset.length() < sphere.radius {
                    if p.position.y > sphere.center.y - sphere.rim_tolerance {
                        p.position.y = sphere.center.y;
                        p.velocity.y = -p.velocity.y * restitution;
                    } else {
                        let normal = offset.normalized();
                        p.position = sphere.center + normal * sphere.radius;
                        p.velocity = p.velocity.reflect(&normal) * restitution;
                    }
                    collided = true;
                }
            }
        }

        if collided {
            let j = self.config.jitter;
            p.velocity += Vec3::new(rng.signed() * j, rng.signed() * j, rng.signed() * j);
            p.view_distance = p.position.dot(&view_direction);
        }
        collided
    }

    /// Absorb `p` into any fire emitter it touches. Every emitter in range
    /// gets wetter, so a fire and its sparks are doused together.
    pub fn extinguish(&self, p: &mut Particle, emitters: &mut [Emitter]) -> bool {
        let mut absorbed = false;
        for emitter in emitters.iter_mut() {
            if !emitter.is_extinguishable() || emitter.is_doused() {
                continue;
            }
            if (p.position - emitter.config.position).length() < self.config.extinguish_radius {
                p.kill();
                emitter.damping += self.config.damping_per_hit;
                absorbed = true;
                if emitter.is_doused() {
                    log::debug!(
                        "[particles] emitter at {:?} extinguished",
                        emitter.config.position
                    );
                }
            }
        }
        absorbed
    }
}
