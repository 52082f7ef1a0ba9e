//! Headless scenario runner

use super::load_scenario;
use anyhow::{bail, Context, Result};
use cinder_core::Vec3;
use cinder_particles::{FrameStats, ParticleSystem};
use cinder_runtime::{FrameContext, GameClock, RuntimeSystem};
use serde::Serialize;

pub struct RunArgs {
    pub scenario: String,
    pub frames: u64,
    pub dt: f32,
    pub seed: Option<u32>,
    pub emit: bool,
    pub view: Option<[f32; 3]>,
    pub eye: Option<[f32; 3]>,
    pub report_every: u64,
    pub format: String,
}

/// One line of run output
#[derive(Debug, Serialize)]
struct FrameReport {
    frame: u64,
    elapsed: f32,
    num_live: usize,
    spawned: usize,
    bounces: usize,
    extinguished: usize,
    emitters: usize,
    doused: usize,
}

impl FrameReport {
    fn new(stats: &FrameStats, doused: usize) -> Self {
        Self {
            frame: stats.frame,
            elapsed: stats.elapsed,
            num_live: stats.num_live,
            spawned: stats.spawned,
            bounces: stats.bounces,
            extinguished: stats.extinguished,
            emitters: stats.emitters,
            doused,
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    if !(args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }
    let view = Vec3::from_array(args.view.unwrap_or([0.0, 0.0, -1.0])).normalized();
    if view == Vec3::ZERO {
        bail!("--view must not be the zero vector");
    }
    let eye = Vec3::from_array(args.eye.unwrap_or([0.0, 1.0, 5.0]));

    let mut config = load_scenario(&args.scenario)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut system = ParticleSystem::new(config).context("Failed to build simulation")?;
    system.initialize()?;

    let mut clock = GameClock::fixed(args.dt as f64);
    let mut peak_live = 0;
    for _ in 0..args.frames {
        clock.tick();
        let frame = FrameContext::new(clock.delta_time as f32, view)
            .with_eye(eye)
            .with_emit(args.emit);
        system.update(&frame)?;

        let stats = *system.simulation.stats();
        peak_live = peak_live.max(stats.num_live);
        if should_report(stats.frame, args.report_every) {
            let report = FrameReport::new(&stats, doused_count(&system));
            print_report(&report, &args.format)?;
        }
    }
    system.shutdown()?;
    log::info!(
        "[cli] '{}' finished after {} frame(s), peak {} live",
        args.scenario,
        args.frames,
        peak_live
    );

    if args.format == "text" {
        let stats = system.simulation.stats();
        println!(
            "Ran '{}' for {} frame(s), {:.2}s simulated: {} live at end, {} peak, {} emitter(s)",
            args.scenario, stats.frame, stats.elapsed, stats.num_live, peak_live, stats.emitters
        );
    }
    Ok(())
}

fn should_report(frame: u64, every: u64) -> bool {
    every > 0 && frame % every == 0
}

fn doused_count(system: &ParticleSystem) -> usize {
    system
        .simulation
        .emitters()
        .iter()
        .filter(|e| e.is_extinguishable() && e.is_doused())
        .count()
}

fn print_report(report: &FrameReport, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!(
            "frame {:>6}  t={:>8.2}s  live={:>7}  spawned={:>5}  bounces={:>5}  doused={}/{}",
            report.frame,
            report.elapsed,
            report.num_live,
            report.spawned,
            report.bounces,
            report.doused,
            report.emitters
        );
    }
    Ok(())
}
