//! Fire spreading: burning emitters occasionally ignite nearby fuel

use crate::collision::WorldBounds;
use crate::emitter::{toml_f32, Emitter, EmitterConfig};
use crate::rand::RandomSource;
use cinder_core::{CinderError, Result, Vec3};

/// Forks new emitters next to a random burning one.
///
/// Each frame there is a `chance_per_second * dt` chance to try. The parent
/// must not be doused, and the new site must land inside the horizontal
/// world bounds; one emitter per profile is placed there.
#[derive(Debug, Clone)]
pub struct SpreadRule {
    pub chance_per_second: f32,
    pub max_emitters: usize,
    /// New sites are offset by up to this much on X and Z
    pub offset_range: f32,
    /// Height new emitters are placed at
    pub spawn_height: f32,
    pub bounds: WorldBounds,
    pub profiles: Vec<EmitterConfig>,
}

impl Default for SpreadRule {
    fn default() -> Self {
        Self {
            chance_per_second: 0.5,
            max_emitters: 100,
            offset_range: 3.0,
            spawn_height: -0.5,
            bounds: WorldBounds::default(),
            profiles: vec![
                EmitterConfig::fire(Vec3::ZERO),
                EmitterConfig::spark(Vec3::ZERO),
            ],
        }
    }
}

impl SpreadRule {
    /// Overlay a `[spread]` TOML table onto `self`
    pub fn apply_toml(&mut self, table: &toml::value::Table) -> Result<()> {
        if let Some(v) = table.get("chance_per_second") {
            self.chance_per_second = toml_f32(v, self.chance_per_second);
        }
        if let Some(v) = table.get("max_emitters") {
            let n = v.as_integer().unwrap_or(self.max_emitters as i64);
            self.max_emitters = n.max(0) as usize;
        }
        if let Some(v) = table.get("offset_range") {
            self.offset_range = toml_f32(v, self.offset_range);
        }
        if let Some(v) = table.get("spawn_height") {
            self.spawn_height = toml_f32(v, self.spawn_height);
        }
        if let Some(v) = table.get("profiles").and_then(|v| v.as_array()) {
            self.profiles = v
                .iter()
                .map(|name| {
                    let name = name.as_str().unwrap_or_default();
                    EmitterConfig::preset(name)
                })
                .collect::<Result<Vec<_>>>()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1000.0).contains(&self.chance_per_second) {
            return Err(CinderError::out_of_range(
                "chance_per_second",
                0.0,
                1000.0,
                self.chance_per_second as f64,
            ));
        }
        if self.offset_range < 0.0 {
            return Err(CinderError::InvalidConfig(format!(
                "spread offset range must not be negative, got {}",
                self.offset_range
            )));
        }
        for profile in &self.profiles {
            profile.validate()?;
        }
        self.bounds.validate()
    }

    /// Attempt one spread step. Returns the number of emitters added.
    pub fn try_spread(
        &self,
        emitters: &mut Vec<Emitter>,
        dt: f32,
        rng: &mut dyn RandomSource,
    ) -> usize {
        if self.profiles.is_empty() || emitters.len() + self.profiles.len() > self.max_emitters {
            return 0;
        }
        if !rng.chance(self.chance_per_second * dt) {
            return 0;
        }

        let burning: Vec<usize> = emitters
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_extinguishable())
            .map(|(i, _)| i)
            .collect();
        if burning.is_empty() {
            return 0;
        }
        let parent = &emitters[burning[rng.index(burning.len())]];
        if parent.is_doused() {
            return 0;
        }

        let from = parent.config.position;
        let dx = rng.range(-self.offset_range, self.offset_range);
        let dz = rng.range(-self.offset_range, self.offset_range);
        let site = Vec3::new(from.x + dx, self.spawn_height, from.z + dz);
        if !self.bounds.contains_xz(site) {
            return 0;
        }

        for profile in &self.profiles {
            let mut config = profile.clone();
            config.position = site;
            let mut emitter = Emitter::new(config);
            emitter.damping = 0.0;
            emitters.push(emitter);
        }
        log::debug!(
            "[particles] fire spread to ({:.2}, {:.2}, {:.2}), {} emitter(s)",
            site.x,
            site.y,
            site.z,
            emitters.len()
        );
        self.profiles.len()
    }
}
