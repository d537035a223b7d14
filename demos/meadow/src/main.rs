//! meadow — a grazing herd on a bounded field.
//!
//! Usage: `meadow [config.json]`.  Without a file the built-in defaults are
//! used; see `meadow.json` next to this crate for every setting.  Set
//! `RUST_LOG=debug` for per-tick engine output.

mod boids;
mod config;
mod scene;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use swarm_agent::ClassificationStats;
use swarm_behavior::BehaviourStrategy;
use swarm_core::{AgentId, AgentRng, Tick};
use swarm_sim::{FlockBuilder, FlockObserver, TickReport};

use boids::Boids;
use config::MeadowConfig;
use scene::Meadow;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct HerdReport {
    every:      u64,
    ticks:      u64,
    committed:  usize,
    overrides:  usize,
    pair_work:  ClassificationStats,
}

impl FlockObserver for HerdReport {
    fn on_classified(&mut self, _tick: Tick, stats: &ClassificationStats) {
        self.pair_work += *stats;
    }

    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        self.ticks += 1;
        self.committed += report.committed;
        self.overrides += report.overrides;
        if self.every > 0 && tick.0.is_multiple_of(self.every) {
            log::info!(
                "{tick}: committed={} fov_checks={} pairs={}",
                report.committed,
                report.classification.fov_evaluations,
                report.classification.pairs_visited,
            );
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => MeadowConfig::load(Path::new(&path))?,
        None => MeadowConfig::default(),
    };
    println!("=== meadow — swarm flocking demo ===");
    println!(
        "Agents: {}  |  Ticks: {}  |  Field: {}  |  Seed: {}",
        config.agents, config.ticks, config.field_size, config.seed
    );
    println!();

    // 1. Strategy and flock.
    let boids: Arc<dyn BehaviourStrategy> =
        Arc::new(Boids::new(config.boids.clone(), config.seed)?);
    let mut flock = FlockBuilder::new(config.flock.clone())
        .agents((0..config.agents).map(AgentId), boids)
        .build()?;

    // 2. Host scene.
    let mut meadow = Meadow::scatter(&config);
    let mut report = HerdReport { every: config.report_every, ..HerdReport::default() };
    let mut jumper = AgentRng::new(config.seed, AgentId::INVALID);

    // 3. Run.
    let t0 = Instant::now();
    for _ in 0..config.ticks {
        let mut positions = meadow.advance();

        let now = flock.tick();
        if config.agents > 0
            && config.jump_every > 0
            && now.0 > 0
            && now.0.is_multiple_of(config.jump_every)
        {
            let id = AgentId(jumper.gen_range(0..config.agents));
            if flock.jump(id)? {
                log::info!("{now}: {id} jumps");
            }
        }

        flock.step(&mut positions, &mut meadow, &mut report)?;
    }
    let elapsed = t0.elapsed();

    // 4. Summary.
    let agents = flock.agents();
    let grouped = agents.iter().filter(|a| a.state().has_neighbours()).count();
    let crowded = agents.iter().filter(|a| a.state().is_crowded()).count();
    let collided = agents.iter().filter(|a| a.state().is_collided()).count();

    println!("Run complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), report.ticks);
    println!("  velocities committed : {}", report.committed);
    println!("  jumps / stops        : {}", report.overrides);
    println!("  pairs visited        : {}", report.pair_work.pairs_visited);
    println!("  distance checks      : {}", report.pair_work.distance_checks);
    println!("  fov evaluations      : {}", report.pair_work.fov_evaluations);
    println!();
    println!("{:<14} {:>6}", "Final state", "Agents");
    println!("{}", "-".repeat(21));
    println!("{:<14} {:>6}", "with company", grouped);
    println!("{:<14} {:>6}", "crowded", crowded);
    println!("{:<14} {:>6}", "collided", collided);
    println!("{:<14} {:>6}", "airborne", meadow.airborne());
    println!();
    println!("Mean ground speed: {:.3}", meadow.mean_speed());

    Ok(())
}
