//! Scenario validation command

use super::load_scenario;
use anyhow::Result;
use cinder_particles::{EmitterAnchor, SimulationConfig};

pub fn run(scenario: &str, format: &str) -> Result<()> {
    let config = load_scenario(scenario)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary_json(&config))?);
    } else {
        print_summary_text(scenario, &config);
    }
    Ok(())
}

fn anchor_name(anchor: &EmitterAnchor) -> &'static str {
    match anchor {
        EmitterAnchor::Fixed => "fixed",
        EmitterAnchor::Viewer { .. } => "viewer",
    }
}

fn summary_json(config: &SimulationConfig) -> serde_json::Value {
    let emitters: Vec<serde_json::Value> = config
        .emitters
        .iter()
        .map(|e| {
            serde_json::json!({
                "kind": e.kind.name(),
                "anchor": anchor_name(&e.anchor),
                "position": e.position.to_array(),
                "emission_rate": e.emission_rate,
                "lifetime": e.lifetime,
                "gated": e.gated,
            })
        })
        .collect();

    serde_json::json!({
        "valid": true,
        "capacity": config.capacity,
        "gravity": config.gravity.to_array(),
        "sort": config.sort,
        "seed": config.seed,
        "collision": config.collision.is_some(),
        "spread": config.spread.as_ref().map(|s| s.max_emitters),
        "emitters": emitters,
    })
}

fn print_summary_text(scenario: &str, config: &SimulationConfig) {
    println!("{} is valid.", scenario);
    println!();
    println!("  capacity:  {}", config.capacity);
    println!(
        "  gravity:   ({}, {}, {})",
        config.gravity.x, config.gravity.y, config.gravity.z
    );
    println!("  sort:      {}", if config.sort { "back-to-front" } else { "off" });
    println!(
        "  collision: {}",
        if config.collision.is_some() { "on" } else { "off" }
    );
    match &config.spread {
        Some(rule) => println!("  spread:    up to {} emitter(s)", rule.max_emitters),
        None => println!("  spread:    off"),
    }
    println!("  emitters:  {}", config.emitters.len());
    for e in &config.emitters {
        println!(
            "    - {} ({}) {}/s for {}s{}",
            e.kind.name(),
            anchor_name(&e.anchor),
            e.emission_rate,
            e.lifetime,
            if e.gated { ", gated" } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_summary_of_fire_scenario() {
        let json = summary_json(&SimulationConfig::fire());
        assert_eq!(json["capacity"], 10_000);
        assert_eq!(json["collision"], true);
        assert_eq!(json["spread"], 100);
        let emitters = json["emitters"].as_array().unwrap();
        assert_eq!(emitters.len(), 3);
        assert_eq!(emitters[2]["kind"], "liquid");
        assert_eq!(emitters[2]["anchor"], "viewer");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(run("/nonexistent/scenario.toml", "text").is_err());
    }
}
