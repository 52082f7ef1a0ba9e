//! CLI command implementations

pub mod check;
pub mod run;
pub mod scenarios;

use anyhow::{Context, Result};
use cinder_particles::SimulationConfig;
use std::path::Path;

/// Resolve a scenario argument: a built-in name, or else a TOML file path
pub fn load_scenario(scenario: &str) -> Result<SimulationConfig> {
    if SimulationConfig::BUILTIN_SCENARIOS.contains(&scenario) {
        log::debug!("[cli] built-in scenario '{}'", scenario);
        return Ok(SimulationConfig::builtin(scenario)?);
    }
    log::debug!("[cli] loading scenario file {}", scenario);
    SimulationConfig::load(Path::new(scenario))
        .with_context(|| format!("Failed to load scenario '{}'", scenario))
}
