//! SEM Montage - automated tiled acquisition for motorized-stage microscopes.
//!
//! This binary plans montage grids and runs simulated acquisitions.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sem_montage::{
    acquisition::AcquisitionController,
    config::{Cli, Command, OutputFormat, PlanConfig, SimulateConfig},
    geometry::{plan_montage, tile_size, MontageSpec, StagePosition},
    instrument::SimulatedInstrument,
    mask::{apply_mask, load_mask},
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(config) => run_plan(config),
        Command::Simulate(config) => run_simulate(config),
    }
}

// =============================================================================
// Plan Command
// =============================================================================

fn run_plan(config: PlanConfig) -> ExitCode {
    init_logging(config.montage.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let tile = match tile_size(config.magnification, config.photo_size_factor) {
        Ok(tile) => tile,
        Err(e) => {
            error!("Field-of-view error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let spec = MontageSpec {
        start: config.montage.start().unwrap_or(StagePosition::new(0, 0)),
        total_height_nm: config.montage.height_nm,
        total_width_nm: config.montage.width_nm,
        tile_height_nm: tile.height_nm,
        tile_width_nm: tile.width_nm,
        overlap: config.montage.overlap,
    };

    let plan = match plan_montage(&spec) {
        Ok(plan) => plan,
        Err(e) => {
            error!("Planning error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Resolve the optional mask down to per-tile flags in visitation order.
    let selected = match &config.montage.mask {
        Some(path) => {
            let mask = match load_mask(path, plan.rows(), plan.cols()) {
                Ok(mask) => mask,
                Err(e) => {
                    error!("Mask error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = apply_mask(&plan, &mask) {
                error!("Mask error: {}", e);
                return ExitCode::FAILURE;
            }
            Some(mask.visitation_order())
        }
        None => None,
    };

    match config.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "rows": plan.rows(),
                "cols": plan.cols(),
                "tile_height_nm": tile.height_nm,
                "tile_width_nm": tile.width_nm,
                "overlap": config.montage.overlap,
                "positions": plan.positions(),
                "selected": selected,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap());
        }
        OutputFormat::Text => {
            let visited = selected
                .as_ref()
                .map(|flags| flags.iter().filter(|&&f| f).count())
                .unwrap_or(plan.len());

            println!("Montage plan");
            println!("════════════");
            println!("  Tile size:  {:.0} x {:.0} nm", tile.width_nm, tile.height_nm);
            println!("  Grid:       {} rows x {} cols", plan.rows(), plan.cols());
            println!("  Tiles:      {} planned, {} to visit", plan.len(), visited);
            println!();
            for (i, position) in plan.positions().iter().enumerate() {
                let marker = match &selected {
                    Some(flags) if !flags[i] => "  (skipped)",
                    _ => "",
                };
                println!("  [{i:4}]  x={:<12} y={:<12}{marker}", position.x, position.y);
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Simulate Command
// =============================================================================

fn run_simulate(config: SimulateConfig) -> ExitCode {
    init_logging(config.montage.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = config.to_settings();

    // The capture directories must exist before the instrument writes into
    // them.
    for dir in [&settings.temp_dir, &settings.output_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            error!("Failed to create directory {}: {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let mut instrument =
        SimulatedInstrument::new().with_focus_drift(config.focus_drift_um, 0.0);
    if let Some(mag) = config.magnification {
        instrument = instrument.with_magnification(mag);
    }

    info!("Starting simulated acquisition");
    info!("  Montage: {} x {} nm", settings.total_width_nm, settings.total_height_nm);
    info!("  Output:  {}", settings.output_dir.display());

    let mut controller = AcquisitionController::new(instrument, settings);
    let report = match controller.run() {
        Ok(report) => report,
        Err(e) => {
            error!("Acquisition failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("Acquisition complete");
    info!("  Grid:     {} rows x {} cols", report.rows, report.cols);
    info!("  Captured: {} of {} planned tiles", report.captured, report.planned);
    if report.skipped > 0 {
        info!("  Skipped:  {} masked-out tiles", report.skipped);
    }
    if !report.focus_failures.is_empty() {
        warn!(
            "  Focus recovery exhausted on {} tile(s): {:?}",
            report.focus_failures.len(),
            report.focus_failures
        );
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "sem_montage=debug"
    } else {
        "sem_montage=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
