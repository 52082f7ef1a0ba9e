//! Scenario configuration: everything needed to build a simulation
//!
//! A scenario file is TOML. Every key is optional:
//!
//! ```toml
//! scenario = "fire"        # start from a built-in scenario
//! capacity = 5000
//! gravity = [0, -9.8, 0]
//! sort = true
//! seed = 7
//!
//! [collision]              # or `collision = false`
//! restitution = 0.4
//!
//! [spread]                 # or `spread = false`
//! max_emitters = 40
//!
//! [galaxy]
//! swirl_duration = 60
//!
//! [[emitter]]              # replaces the base scenario's emitters
//! preset = "fire"
//! position = [0, 0.5, 0]
//! ```

use crate::collision::CollisionConfig;
use crate::emitter::{toml_vec3, EmitterConfig};
use crate::integrate::GalaxyMotion;
use crate::spread::SpreadRule;
use cinder_core::{CinderError, Result, Vec3};
use std::path::Path;

/// Full configuration of one particle simulation
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of particle slots; fixed for the simulation's lifetime
    pub capacity: usize,
    pub gravity: Vec3,
    /// Sort back-to-front each frame (needed for alpha blending)
    pub sort: bool,
    pub seed: u32,
    pub emitters: Vec<EmitterConfig>,
    pub collision: Option<CollisionConfig>,
    pub spread: Option<SpreadRule>,
    pub galaxy: GalaxyMotion,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            sort: true,
            seed: 0xDEAD_BEEF,
            emitters: Vec::new(),
            collision: None,
            spread: None,
            galaxy: GalaxyMotion::default(),
        }
    }
}

impl SimulationConfig {
    pub const BUILTIN_SCENARIOS: [&'static str; 2] = ["fire", "galaxy"];

    /// Look up a built-in scenario by name
    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            "fire" => Ok(Self::fire()),
            "galaxy" => Ok(Self::galaxy()),
            _ => Err(CinderError::UnknownPreset(name.to_string())),
        }
    }

    /// A campfire in a grill bowl, a water hose on the viewer, and fire
    /// that spreads across the floor until it is hosed down
    pub fn fire() -> Self {
        let site = Vec3::new(2.0, 0.5, 2.0);
        Self {
            emitters: vec![
                EmitterConfig::fire(site),
                EmitterConfig::spark(site),
                EmitterConfig::hose(),
            ],
            collision: Some(CollisionConfig::default()),
            spread: Some(SpreadRule::default()),
            ..Default::default()
        }
    }

    /// A swirling cloud of colored points in zero gravity, drawn additively
    pub fn galaxy() -> Self {
        Self {
            capacity: 100_000,
            gravity: Vec3::ZERO,
            sort: false,
            emitters: vec![EmitterConfig::galaxy()],
            ..Default::default()
        }
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CinderError::TomlParseError(msg) => {
                CinderError::TomlParseError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(content)?;
        Self::from_toml(&table)
    }

    /// Build a configuration from a parsed scenario table
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = match table.get("scenario").and_then(|v| v.as_str()) {
            Some(name) => Self::builtin(name)?,
            None => Self::default(),
        };

        if let Some(v) = table.get("capacity") {
            let n = v.as_integer().ok_or_else(|| {
                CinderError::InvalidConfig("capacity must be an integer".to_string())
            })?;
            config.capacity = n.max(0) as usize;
        }
        if let Some(v) = table.get("gravity") {
            config.gravity = toml_vec3(v, config.gravity);
        }
        if let Some(v) = table.get("sort") {
            config.sort = v.as_bool().unwrap_or(config.sort);
        }
        if let Some(v) = table.get("seed") {
            let seed = v.as_integer().unwrap_or(config.seed as i64);
            config.seed = seed as u32;
        }

        match table.get("collision") {
            Some(toml::Value::Table(t)) => {
                config
                    .collision
                    .get_or_insert_with(CollisionConfig::default)
                    .apply_toml(t)?;
            }
            Some(toml::Value::Boolean(false)) => config.collision = None,
            Some(toml::Value::Boolean(true)) => {
                config.collision.get_or_insert_with(CollisionConfig::default);
            }
            _ => {}
        }
        match table.get("spread") {
            Some(toml::Value::Table(t)) => {
                config
                    .spread
                    .get_or_insert_with(SpreadRule::default)
                    .apply_toml(t)?;
            }
            Some(toml::Value::Boolean(false)) => config.spread = None,
            Some(toml::Value::Boolean(true)) => {
                config.spread.get_or_insert_with(SpreadRule::default);
            }
            _ => {}
        }
        // Fire spreads within the same walls the water bounces off
        if let (Some(collision), Some(spread)) = (&config.collision, &mut config.spread) {
            spread.bounds = collision.bounds;
        }
        if let Some(t) = table.get("galaxy").and_then(|v| v.as_table()) {
            config.galaxy.apply_toml(t)?;
        }

        if let Some(v) = table.get("emitter") {
            let entries = v.as_array().ok_or_else(|| {
                CinderError::InvalidConfig("`emitter` must be an array of tables".to_string())
            })?;
            config.emitters = entries
                .iter()
                .map(|entry| match entry.as_table() {
                    Some(t) => EmitterConfig::from_toml(t),
                    None => Err(CinderError::InvalidConfig(
                        "each [[emitter]] entry must be a table".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CinderError::InvalidConfig(
                "particle capacity must be at least 1".to_string(),
            ));
        }
        for emitter in &self.emitters {
            emitter.validate()?;
        }
        if let Some(collision) = &self.collision {
            collision.validate()?;
        }
        if let Some(spread) = &self.spread {
            spread.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterAnchor;
    use crate::particle::ParticleKind;

    #[test]
    fn builtin_scenarios_are_valid() {
        for name in SimulationConfig::BUILTIN_SCENARIOS {
            SimulationConfig::builtin(name).unwrap().validate().unwrap();
        }
        assert!(SimulationConfig::builtin("aurora").is_err());
    }

    #[test]
    fn fire_scenario_layout() {
        let config = SimulationConfig::fire();
        assert_eq!(config.capacity, 10_000);
        assert!(config.sort);
        assert_eq!(config.emitters.len(), 3);
        assert_eq!(
            config.emitters[2].anchor,
            EmitterAnchor::Viewer { speed: 10.0 }
        );
        assert!(config.collision.is_some());
        assert!(config.spread.is_some());
    }

    #[test]
    fn galaxy_scenario_layout() {
        let config = SimulationConfig::galaxy();
        assert_eq!(config.capacity, 100_000);
        assert_eq!(config.gravity, Vec3::ZERO);
        assert!(!config.sort);
        assert_eq!(config.emitters[0].kind, ParticleKind::Galaxy);
        assert!(config.collision.is_none());
        assert!(config.spread.is_none());
    }

    #[test]
    fn parse_full_scenario() {
        let toml_str = r#"
capacity = 500
gravity = [0, -3, 0]
sort = false
seed = 99

[collision]
restitution = 0.25
bounds_min = [-2, 0, -2]
bounds_max = [2, 4, 2]
obstacle = false

[spread]
max_emitters = 12

[galaxy]
swirl_duration = 40

[[emitter]]
preset = "fire"
position = [0, 0.5, 0]

[[emitter]]
preset = "hose"
emission_rate = 300
"#;
        let config = SimulationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.capacity, 500);
        assert_eq!(config.gravity, Vec3::new(0.0, -3.0, 0.0));
        assert!(!config.sort);
        assert_eq!(config.seed, 99);

        let collision = config.collision.as_ref().unwrap();
        assert!((collision.restitution - 0.25).abs() < 1e-6);
        assert!(collision.obstacle.is_none());

        let spread = config.spread.as_ref().unwrap();
        assert_eq!(spread.max_emitters, 12);
        assert_eq!(spread.bounds.max, Vec3::new(2.0, 4.0, 2.0));

        assert_eq!(config.galaxy.swirl_duration, 40.0);
        assert_eq!(config.emitters.len(), 2);
        assert_eq!(config.emitters[0].position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(config.emitters[1].kind, ParticleKind::Liquid);
        assert!((config.emitters[1].emission_rate - 300.0).abs() < 1e-6);
    }

    #[test]
    fn scenario_base_with_overrides() {
        let toml_str = r#"
scenario = "fire"
capacity = 2000
spread = false
"#;
        let config = SimulationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.capacity, 2000);
        assert!(config.spread.is_none());
        assert!(config.collision.is_some());
        // No [[emitter]] entries, so the base emitters stay
        assert_eq!(config.emitters.len(), 3);
    }

    #[test]
    fn rejects_invalid_scenarios() {
        let cases = [
            "capacity = 0",
            "capacity = \"lots\"",
            "scenario = \"aurora\"",
            "[collision]\nrestitution = 1.5",
            "[[emitter]]\nlifetime = -1",
            "emitter = 3",
            "capacity = [",
        ];
        for case in cases {
            assert!(
                SimulationConfig::from_toml_str(case).is_err(),
                "accepted {case}"
            );
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SimulationConfig::from_toml_str("capacity = [").unwrap_err();
        assert!(matches!(err, CinderError::TomlParseError(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
        assert!(matches!(err, CinderError::IoError(_)));
    }
}
