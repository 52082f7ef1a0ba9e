//! List built-in scenarios

use anyhow::Result;
use cinder_particles::SimulationConfig;

fn describe(name: &str) -> &'static str {
    match name {
        "fire" => "campfire in a grill bowl with a viewer hose; fire spreads until doused",
        "galaxy" => "swirling cloud of colored points in zero gravity",
        _ => "",
    }
}

pub fn run() -> Result<()> {
    println!("Built-in scenarios:");
    for name in SimulationConfig::BUILTIN_SCENARIOS {
        let config = SimulationConfig::builtin(name)?;
        println!(
            "  {:<8} {} ({} slots, {} emitter(s))",
            name,
            describe(name),
            config.capacity,
            config.emitters.len()
        );
    }
    Ok(())
}
