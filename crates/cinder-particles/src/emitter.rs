//! Emitter configuration (parsed from TOML) and runtime state

use crate::particle::{Particle, ParticleKind, ParticlePool};
use crate::rand::{RandomSource, SprayOrder};
use crate::spread::SpreadRule;
use cinder_core::{CinderError, Color, Result, Vec3};
use cinder_runtime::FrameContext;

/// Where an emitter sits and which way it sprays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitterAnchor {
    /// Fixed world position (`position`), spraying along `velocity`
    Fixed,
    /// Follows the viewer: the emission box is centered on the eye plus
    /// `position`, and the base velocity is the view direction times `speed`
    Viewer { speed: f32 },
}

/// Configuration for one emitter
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    pub kind: ParticleKind,
    pub anchor: EmitterAnchor,
    pub position: Vec3,
    /// Half-extents of the emission box
    pub volume: Vec3,
    pub velocity: Vec3,
    /// Random speed multiplier is drawn from `[velocity_floor, velocity_range)`
    pub velocity_floor: f32,
    pub velocity_range: f32,
    /// Azimuth arc in degrees (rotation about +Y)
    pub azimuth: (f32, f32),
    /// Elevation arc in degrees (rotation about +Z)
    pub elevation: (f32, f32),
    pub spray_order: SprayOrder,
    pub color_start: Color,
    pub color_end: Color,
    /// Per-channel jitter applied to `color_start` at spawn
    pub color_jitter: f32,
    /// Give every particle a uniformly random color instead of `color_start`;
    /// the life blend then leaves it unchanged
    pub randomize_color: bool,
    pub size: f32,
    pub size_jitter: f32,
    /// Particles per second
    pub emission_rate: f32,
    pub lifetime: f32,
    /// Initial damping ("wetness")
    pub damping: f32,
    /// Emit only while the frame's emit signal is on
    pub gated: bool,
    /// Emission multiplier grows as `elapsed / ramp_time`
    pub ramp_time: Option<f32>,
    /// Stop emitting once this much simulated time has passed
    pub active_until: Option<f32>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            kind: ParticleKind::Fire,
            anchor: EmitterAnchor::Fixed,
            position: Vec3::ZERO,
            volume: Vec3::ZERO,
            velocity: Vec3::UP,
            velocity_floor: 0.0,
            velocity_range: 1.0,
            azimuth: (0.0, 0.0),
            elevation: (0.0, 0.0),
            spray_order: SprayOrder::AzimuthFirst,
            color_start: Color::WHITE,
            color_end: Color::new(1.0, 1.0, 1.0, 0.0),
            color_jitter: 0.0,
            randomize_color: false,
            size: 0.5,
            size_jitter: 0.0,
            emission_rate: 10.0,
            lifetime: 1.0,
            damping: 0.0,
            gated: false,
            ramp_time: None,
            active_until: None,
        }
    }
}

impl EmitterConfig {
    pub const PRESETS: [&'static str; 4] = ["fire", "spark", "hose", "galaxy"];

    /// Look up a named emitter profile
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "fire" => Ok(Self::fire(Vec3::new(2.0, 0.5, 2.0))),
            "spark" => Ok(Self::spark(Vec3::new(2.0, 0.5, 2.0))),
            "hose" => Ok(Self::hose()),
            "galaxy" => Ok(Self::galaxy()),
            _ => Err(CinderError::UnknownPreset(name.to_string())),
        }
    }

    /// Slow, long-lived orange flame that fades to nothing
    pub fn fire(position: Vec3) -> Self {
        Self {
            kind: ParticleKind::Fire,
            position,
            volume: Vec3::new(0.25, 0.0, 0.25),
            velocity: Vec3::new(0.25, 1.0, 0.0),
            velocity_range: 2.0,
            azimuth: (0.0, 360.0),
            elevation: (0.0, 10.0),
            color_start: Color::new(0.682, 0.306, 0.0, 0.8),
            color_end: Color::TRANSPARENT,
            size: 1.0,
            emission_rate: 50.0,
            lifetime: 3.0,
            ..Default::default()
        }
    }

    /// Dense, short-lived yellow-to-red sparks riding with a fire
    pub fn spark(position: Vec3) -> Self {
        Self {
            color_start: Color::new(1.0, 1.0, 0.0, 1.0),
            color_end: Color::new(1.0, 0.0, 0.0, 0.5),
            size: 0.5,
            emission_rate: 200.0,
            lifetime: 0.5,
            ..Self::fire(position)
        }
    }

    /// Water sprayed from just above the viewer while the emit signal is held
    pub fn hose() -> Self {
        Self {
            kind: ParticleKind::Liquid,
            anchor: EmitterAnchor::Viewer { speed: 10.0 },
            position: Vec3::UP,
            volume: Vec3::new(0.5, 0.5, 0.5),
            velocity_floor: 1.0,
            velocity_range: 1.0,
            color_start: Color::new(0.0, 0.2, 0.9, 0.8),
            color_end: Color::new(0.7, 0.9, 1.0, 0.1),
            color_jitter: 0.05,
            size: 0.5,
            emission_rate: 1000.0,
            lifetime: 2.0,
            gated: true,
            ..Default::default()
        }
    }

    /// Randomly colored particles filling a cube, emitted at a ramping rate
    pub fn galaxy() -> Self {
        Self {
            kind: ParticleKind::Galaxy,
            volume: Vec3::new(5.0, 5.0, 5.0),
            velocity: Vec3::new(10.0, 0.0, 0.0),
            velocity_range: 2.0,
            azimuth: (-2.0, 2.0),
            elevation: (-2.0, 2.0),
            spray_order: SprayOrder::ElevationFirst,
            randomize_color: true,
            size: 0.0,
            size_jitter: 0.4,
            emission_rate: 1000.0,
            lifetime: 120.0,
            ramp_time: Some(10.0),
            active_until: Some(100.0),
            ..Default::default()
        }
    }

    /// Parse an EmitterConfig from a TOML table. A `preset` key selects the
    /// starting profile; every other key overrides it.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = match table.get("preset").and_then(|v| v.as_str()) {
            Some(name) => Self::preset(name)?,
            None => Self::default(),
        };

        if let Some(v) = table.get("kind") {
            let name = v.as_str().unwrap_or_default();
            config.kind = ParticleKind::from_name(name).ok_or_else(|| {
                CinderError::InvalidEnumValue {
                    value: name.to_string(),
                    allowed: ParticleKind::NAMES.iter().map(|s| s.to_string()).collect(),
                }
            })?;
        }
        match table.get("anchor").and_then(|v| v.as_str()) {
            Some("viewer") => {
                let speed = table
                    .get("speed")
                    .map(|v| toml_f32(v, 10.0))
                    .unwrap_or(match config.anchor {
                        EmitterAnchor::Viewer { speed } => speed,
                        EmitterAnchor::Fixed => 10.0,
                    });
                config.anchor = EmitterAnchor::Viewer { speed };
            }
            Some("fixed") => config.anchor = EmitterAnchor::Fixed,
            Some(other) => {
                return Err(CinderError::InvalidEnumValue {
                    value: other.to_string(),
                    allowed: vec!["fixed".to_string(), "viewer".to_string()],
                })
            }
            None => {
                if let (Some(v), EmitterAnchor::Viewer { .. }) = (table.get("speed"), config.anchor)
                {
                    config.anchor = EmitterAnchor::Viewer {
                        speed: toml_f32(v, 10.0),
                    };
                }
            }
        }
        if let Some(v) = table.get("position") {
            config.position = toml_vec3(v, config.position);
        }
        if let Some(v) = table.get("volume") {
            config.volume = toml_vec3(v, config.volume);
        }
        if let Some(v) = table.get("velocity") {
            config.velocity = toml_vec3(v, config.velocity);
        }
        if let Some(v) = table.get("velocity_floor") {
            config.velocity_floor = toml_f32(v, config.velocity_floor);
        }
        if let Some(v) = table.get("velocity_range") {
            config.velocity_range = toml_f32(v, config.velocity_range);
        }
        if let Some(v) = table.get("azimuth") {
            config.azimuth = toml_pair(v, config.azimuth);
        }
        if let Some(v) = table.get("elevation") {
            config.elevation = toml_pair(v, config.elevation);
        }
        if let Some(v) = table.get("spray_order") {
            let name = v.as_str().unwrap_or_default();
            config.spray_order = SprayOrder::from_name(name).ok_or_else(|| {
                CinderError::InvalidEnumValue {
                    value: name.to_string(),
                    allowed: vec!["azimuth_first".to_string(), "elevation_first".to_string()],
                }
            })?;
        }
        if let Some(v) = table.get("color_start") {
            config.color_start = toml_color(v, config.color_start);
        }
        if let Some(v) = table.get("color_end") {
            config.color_end = toml_color(v, config.color_end);
        }
        if let Some(v) = table.get("color_jitter") {
            config.color_jitter = toml_f32(v, config.color_jitter);
        }
        if let Some(v) = table.get("randomize_color") {
            config.randomize_color = v.as_bool().unwrap_or(config.randomize_color);
        }
        if let Some(v) = table.get("size") {
            config.size = toml_f32(v, config.size);
        }
        if let Some(v) = table.get("size_jitter") {
            config.size_jitter = toml_f32(v, config.size_jitter);
        }
        if let Some(v) = table.get("emission_rate") {
            config.emission_rate = toml_f32(v, config.emission_rate);
        }
        if let Some(v) = table.get("lifetime") {
            config.lifetime = toml_f32(v, config.lifetime);
        }
        if let Some(v) = table.get("damping") {
            config.damping = toml_f32(v, config.damping);
        }
        if let Some(v) = table.get("gated") {
            config.gated = v.as_bool().unwrap_or(config.gated);
        }
        if let Some(v) = table.get("ramp_time") {
            config.ramp_time = Some(toml_f32(v, 1.0));
        }
        if let Some(v) = table.get("active_until") {
            config.active_until = Some(toml_f32(v, 0.0));
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<()> {
        if !(self.lifetime > 0.0) {
            return Err(CinderError::InvalidConfig(format!(
                "emitter lifetime must be positive, got {}",
                self.lifetime
            )));
        }
        if !(self.emission_rate >= 0.0) {
            return Err(CinderError::InvalidConfig(format!(
                "emission rate must not be negative, got {}",
                self.emission_rate
            )));
        }
        if self.size < 0.0 || self.size_jitter < 0.0 || self.color_jitter < 0.0 {
            return Err(CinderError::InvalidConfig(
                "size, size jitter and color jitter must not be negative".to_string(),
            ));
        }
        if self.velocity_floor < 0.0 || self.velocity_range < self.velocity_floor {
            return Err(CinderError::InvalidConfig(format!(
                "velocity range [{}, {}] is invalid",
                self.velocity_floor, self.velocity_range
            )));
        }
        if self.volume.x < 0.0 || self.volume.y < 0.0 || self.volume.z < 0.0 {
            return Err(CinderError::InvalidConfig(
                "emission volume half-extents must not be negative".to_string(),
            ));
        }
        if self.azimuth.0 > self.azimuth.1 || self.elevation.0 > self.elevation.1 {
            return Err(CinderError::InvalidConfig(
                "azimuth and elevation arcs must be given as [min, max]".to_string(),
            ));
        }
        if let Some(ramp) = self.ramp_time {
            if !(ramp > 0.0) {
                return Err(CinderError::InvalidConfig(format!(
                    "ramp time must be positive, got {ramp}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(CinderError::out_of_range(
                "damping",
                0.0,
                1.0,
                self.damping as f64,
            ));
        }
        Ok(())
    }
}

/// Runtime state for one emitter
#[derive(Debug, Clone)]
pub struct Emitter {
    pub config: EmitterConfig,
    /// Accumulated wetness; output scales by `1 - damping`
    pub damping: f32,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Self {
        let damping = config.damping;
        Self { config, damping }
    }

    /// Fixed fire emitters can be doused by liquid and can spread
    pub fn is_extinguishable(&self) -> bool {
        self.config.kind == ParticleKind::Fire && self.config.anchor == EmitterAnchor::Fixed
    }

    pub fn is_doused(&self) -> bool {
        self.damping >= 1.0
    }

    /// Center of the emission box this frame
    pub fn origin(&self, frame: &FrameContext) -> Vec3 {
        match self.config.anchor {
            EmitterAnchor::Fixed => self.config.position,
            EmitterAnchor::Viewer { .. } => frame.eye + self.config.position,
        }
    }

    fn is_active(&self, frame: &FrameContext, elapsed: f32) -> bool {
        if self.config.gated && !frame.emit {
            return false;
        }
        match self.config.active_until {
            Some(until) => elapsed < until,
            None => true,
        }
    }

    /// How many particles to emit over `dt`. The whole part of the expected
    /// count is always emitted; the fractional part becomes the probability
    /// of one more, so low rates average out correctly.
    pub fn spawn_count(&self, dt: f32, elapsed: f32, rng: &mut dyn RandomSource) -> u32 {
        let mut expected = dt * self.config.emission_rate * (1.0 - self.damping);
        if let Some(ramp) = self.config.ramp_time {
            expected *= elapsed / ramp;
        }
        let expected = expected.max(0.0);
        let whole = expected.floor();
        let extra = rng.chance(expected - whole);
        whole as u32 + u32::from(extra)
    }

    /// Write a fresh particle into `p`
    pub fn spawn_into(&self, p: &mut Particle, frame: &FrameContext, rng: &mut dyn RandomSource) {
        let cfg = &self.config;

        p.position = self.origin(frame) + rng.in_box(cfg.volume);

        let base = match cfg.anchor {
            EmitterAnchor::Fixed => cfg.velocity,
            EmitterAnchor::Viewer { speed } => frame.view_direction * speed,
        };
        let magnitude = rng.range(cfg.velocity_floor, cfg.velocity_range);
        p.velocity = rng.spray(base * magnitude, cfg.azimuth, cfg.elevation, cfg.spray_order);

        let start = if cfg.randomize_color {
            Color::new(rng.next_f32(), rng.next_f32(), rng.next_f32(), rng.next_f32())
        } else if cfg.color_jitter > 0.0 {
            let j = cfg.color_jitter;
            let jitter = Color::new(rng.signed(), rng.signed(), rng.signed(), rng.signed()) * j;
            cfg.color_start + jitter
        } else {
            cfg.color_start
        };
        p.color = start;
        p.color_start = start;
        p.color_end = if cfg.randomize_color { start } else { cfg.color_end };

        p.size = if cfg.size_jitter > 0.0 {
            cfg.size + rng.next_f32() * cfg.size_jitter
        } else {
            cfg.size
        };
        p.life = cfg.lifetime;
        p.max_life = cfg.lifetime;
        p.kind = cfg.kind;
        p.view_distance = p.position.dot(&frame.view_direction);
    }
}

/// All emitters in a simulation, plus the optional rule that grows the set
pub struct EmitterSet {
    emitters: Vec<Emitter>,
    spread: Option<SpreadRule>,
}

impl EmitterSet {
    pub fn new(emitters: Vec<Emitter>, spread: Option<SpreadRule>) -> Self {
        Self { emitters, spread }
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn push(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    /// Run the spread rule once; returns how many emitters were added
    pub fn spread(&mut self, dt: f32, rng: &mut dyn RandomSource) -> usize {
        match &self.spread {
            Some(rule) => rule.try_spread(&mut self.emitters, dt, rng),
            None => 0,
        }
    }

    /// Spawn this frame's particles into free pool slots. An emitter that
    /// finds the pool full stops for the frame; saturation is not an error.
    pub fn emit(
        &self,
        pool: &mut ParticlePool,
        frame: &FrameContext,
        elapsed: f32,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let mut spawned = 0;
        for emitter in &self.emitters {
            if !emitter.is_active(frame, elapsed) {
                continue;
            }
            let count = emitter.spawn_count(frame.dt, elapsed, rng);
            for _ in 0..count {
                let Some(p) = pool.spawn() else {
                    break;
                };
                emitter.spawn_into(p, frame, rng);
                spawned += 1;
            }
        }
        spawned
    }
}

// ── TOML helpers (handle integer/float coercion) ──

pub(crate) fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}

pub(crate) fn toml_pair(v: &toml::Value, default: (f32, f32)) -> (f32, f32) {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 2 {
            return (toml_f32(&arr[0], default.0), toml_f32(&arr[1], default.1));
        }
    }
    default
}

pub(crate) fn toml_vec3(v: &toml::Value, default: Vec3) -> Vec3 {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 3 {
            return Vec3::new(
                toml_f32(&arr[0], default.x),
                toml_f32(&arr[1], default.y),
                toml_f32(&arr[2], default.z),
            );
        }
    }
    default
}

fn toml_color(v: &toml::Value, default: Color) -> Color {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 4 {
            return Color::new(
                toml_f32(&arr[0], default.r),
                toml_f32(&arr[1], default.g),
                toml_f32(&arr[2], default.b),
                toml_f32(&arr[3], default.a),
            );
        }
    }
    default
}
