//! Demo binary that drives the merged block scanner over a generated world.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p sweep-demo` for the default five steps.
//! Run with `cargo run -p sweep-demo -- --steps 20 --radius 48 --log-level debug` to push it harder.

mod consumers;
mod worldgen;

use clap::Parser;
use sweep_config::{CliArgs, Config, default_config_dir};
use sweep_scan::{BlockScanner, ScanError};
use sweep_voxel::{BlockPos, StateRegistry, VoxelStore, VoxelWorld};
use tracing::{error, info, warn};

use crate::consumers::Sinks;
use crate::worldgen::DemoStates;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    sweep_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions) && config.debug.log_to_file,
        Some(&config),
    );

    let mut registry = StateRegistry::new();
    let states = match DemoStates::register(&mut registry) {
        Ok(states) => states,
        Err(e) => {
            error!("Failed to register demo states: {e}");
            std::process::exit(1);
        }
    };
    info!("Registered {} block states", registry.len());

    let world = worldgen::generate(&config.demo, &states);

    if let Err(e) = run_steps(&config, &world, &states, &registry) {
        error!("Scan request rejected: {e}");
        std::process::exit(1);
    }
}

/// Walks the observer east across the world, one scan per step.
fn run_steps(
    config: &Config,
    world: &VoxelWorld,
    states: &DemoStates,
    registry: &StateRegistry,
) -> Result<(), ScanError> {
    let sinks = Sinks::default();
    let mut scanner = BlockScanner::with_config(config.scan.clone());

    for step in 0..config.demo.steps {
        let observer = BlockPos::new(step as i32 * 7 - 20, 64, 3);
        if world.column(observer.column()).is_none() {
            warn!(
                "Observer column ({}, {}) is not loaded",
                observer.column().x,
                observer.column().z
            );
        }

        sinks.reset();
        consumers::register_all(&mut scanner, registry, states, &sinks, &config.demo)?;
        let report = scanner.begin_step(world, observer);

        info!(
            "Step {}: {} requests, {} sections ({} uniform, {} pre-decoded, {} immediate), {} voxels, {} missing columns",
            step,
            report.requests,
            report.sections(),
            report.uniform_sections,
            report.predecoded_sections,
            report.immediate_sections,
            report.voxels,
            report.missing_columns,
        );

        for (state, count) in sinks.ore_census.borrow().iter() {
            info!("  {}: {}", registry.name(*state), count);
        }
        match sinks.diamond.get() {
            Some(pos) => info!("  first diamond at ({}, {}, {})", pos.x, pos.y, pos.z),
            None => info!("  no diamond within prospecting radius"),
        }
    }

    info!(
        "Ran {} steps, {} request slots allocated",
        sinks.summaries.get(),
        scanner.pool_capacity()
    );
    Ok(())
}
