use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::cli::render;
use crate::config::simulation::SimulationConfig;
use crate::report::StatsLog;
use crate::world::World;

/// Command-line overrides for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub seed: Option<u64>,
    pub ticks: Option<u64>,
    pub no_render: bool,
}

/// Build the world and drive ticks at the configured rate until `max_ticks`
/// is reached or Ctrl-C is pressed.
pub async fn run_simulation(config: &SimulationConfig, options: &RunOptions) -> Result<(), String> {
    let mut params = config.model.clone();
    if let Some(seed) = options.seed {
        params.seed = seed;
    }
    let max_ticks = options.ticks.unwrap_or(config.max_ticks);
    let render_frames = config.render && !options.no_render;

    let mut world = World::new(params).map_err(|e| format!("Failed to build world: {}", e))?;

    let mut stats_log = match &config.stats_output {
        Some(path) => Some(
            StatsLog::create(Path::new(path))
                .map_err(|e| format!("Cannot open statistics log: {}", e))?,
        ),
        None => None,
    };

    info!(
        seed = world.seed(),
        cells = world.grid().len(),
        cops = world.cop_count(),
        agents = world.agent_count(),
        tick_rate_hz = config.tick_rate_hz,
        max_ticks,
        "Simulation running"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let interval = config.tick_interval();
    let mut was_reported = false;

    loop {
        let tick_start = Instant::now();
        let result = world.tick();
        let stats = &result.statistics;

        if render_frames {
            println!("{}", render::render_frame(&world, stats));
        }

        if let Some(log) = stats_log.as_mut() {
            log.append(stats, config.report_threshold)
                .map_err(|e| format!("Cannot write statistics: {}", e))?;
        }

        let reported = stats.counts.is_reported(config.report_threshold);
        if reported && !was_reported {
            warn!(
                tick = stats.tick,
                ratio = stats.counts.rebellion_ratio(),
                threshold = config.report_threshold,
                "Rebellion above report threshold"
            );
        }
        was_reported = reported;

        if stats.tick % 100 == 0 {
            info!(
                tick = stats.tick,
                quiet = stats.counts.quiet,
                jailed = stats.counts.jailed,
                active = stats.counts.active,
                "Tick milestone"
            );
        }

        if max_ticks > 0 && world.tick_count() >= max_ticks {
            break;
        }

        // Rate limiting: sleep the rest of the tick interval
        let sleep_duration = interval.saturating_sub(tick_start.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(sleep_duration) => {}
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if let Some(log) = &stats_log {
        info!(path = %log.path().display(), "Statistics written");
    }
    info!(tick = world.tick_count(), "Simulation stopped");
    Ok(())
}

/// Validate the configuration and build a world once, printing its layout.
pub fn check(config: &SimulationConfig) -> Result<(), String> {
    let world = World::new(config.model.clone()).map_err(|e| format!("{}", e))?;
    let counts = world.counts();

    println!("=== Configuration OK ===");
    println!(
        "Grid: {} x {} ({} cells)",
        world.width(),
        world.height(),
        world.grid().len()
    );
    println!("Vision radius: {}", world.params().vision);
    println!("Cops: {}", world.cop_count());
    println!("Agents: {} (all {} quiet)", world.agent_count(), counts.quiet);
    println!(
        "Free cells: {}",
        world.grid().len() - world.cop_count() - world.agent_count()
    );
    println!("Seed: {}", world.seed());
    Ok(())
}
