//! Headless dashboard runner
//!
//! Runs the telemetry engine and logs a frame summary about once a second
//! until interrupted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pacenote::config::{DashConfig, SourceKind};
use pacenote::metrics::{UnitSystem, format_delta, format_lap_time};
use pacenote::{Engine, FrameOutput, Renderer};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pacenote")]
#[command(about = "Read live rally telemetry and log derived dashboard metrics")]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured telemetry source
    #[arg(short, long)]
    source: Option<SourceArg>,

    /// Show speed and distance in miles
    #[arg(long)]
    imperial: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SourceArg {
    /// Fixed-layout shared memory pages
    SharedMemory,
    /// Schema-described UDP datagrams
    Network,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::SharedMemory => SourceKind::SharedMemory,
            SourceArg::Network => SourceKind::Network,
        }
    }
}

/// Logs one summary line per `every` frames, and on every availability change.
struct LogRenderer {
    every: u64,
    frames: u64,
    was_available: Option<bool>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &FrameOutput) {
        self.frames += 1;
        let changed = self.was_available != Some(frame.source_available);
        self.was_available = Some(frame.source_available);
        if !changed && self.frames % self.every != 0 {
            return;
        }

        match (&frame.snapshot, &frame.metrics) {
            (Some(snapshot), Some(metrics)) => info!(
                gear = %metrics.gear_label,
                speed = %format!("{:.0} {}", metrics.display_speed, metrics.speed_unit.label()),
                rpm = snapshot.rpm,
                rpm_ratio = %format!("{:.2}", metrics.rpm_ratio),
                lap = %format_lap_time(snapshot.current_lap_ms),
                best = %format_lap_time(snapshot.best_lap_ms),
                delta = %format_delta(metrics.lap_delta),
                estimate = %metrics.estimated_stage_ms.map(format_lap_time).unwrap_or_else(|| format_lap_time(0)),
                progress = %format!("{:.1}%", metrics.progress_pct),
                distance = %format!("{:.2} {}", metrics.display_distance, metrics.distance_unit.label()),
                tc = metrics.traction_control_label(),
                abs = metrics.abs_label(),
                "Frame"
            ),
            _ if frame.source_available => info!("Source connected, waiting for data"),
            _ => info!("Waiting for telemetry source"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pacenote=info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => DashConfig::default(),
    };
    if let Some(source) = args.source {
        config.source = source.into();
    }
    if args.imperial {
        config.units = UnitSystem::Imperial;
    }

    let mut engine = match Engine::from_config(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to start: {e}");
            for suggestion in e.recovery_suggestions() {
                error!("  - {suggestion}");
            }
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
        }
        on_signal.cancel();
    });

    let mut renderer =
        LogRenderer { every: u64::from(config.refresh_rate_hz), frames: 0, was_available: None };
    let stats = engine.run(&mut renderer, cancel).await?;
    info!(ticks = stats.ticks, records = stats.records, errors = stats.source_errors, "Done");
    Ok(())
}
