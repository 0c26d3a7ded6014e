//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Binary entrypoint for the reefer telemetry simulator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use reefer_common::config::{AppConfig, LoadedAppConfig};
use reefer_common::logging::{init_tracing, LogFormat};
use reefer_sim::{
    run_delivery_until, DeliveryController, HttpTelemetryPublisher, RandomWalkGenerator,
    TickScheduler,
};
use tokio::signal;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "reeferd";
const DEFAULT_CONFIG_PATH: &str = "configs/reefer.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Simulate a refrigerated truck delivery and report sensor readings to ThingsBoard",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    /// ThingsBoard host, optionally with port (e.g. demo.thingsboard.io:80)
    #[arg(long, env = "THINGSBOARD_HOST")]
    host: Option<String>,

    /// Device access token
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Seconds between sensor readings
    #[arg(long)]
    tick_interval_secs: Option<u64>,

    /// Total delivery duration in seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Seed the sensor random walk for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, help = "Override console log format")]
    log_format: Option<CliLogFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Pretty,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::StructuredJson,
        }
    }
}

/// CLI and environment values win over the configuration file.
fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(host) = &cli.host {
        config.thingsboard.host = host.clone();
    }
    if let Some(token) = &cli.token {
        config.thingsboard.access_token = token.clone();
    }
    if let Some(secs) = cli.tick_interval_secs {
        config.simulation.tick_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.duration_secs {
        config.simulation.run_duration = Duration::from_secs(secs);
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
}

/// An explicit `--config` must exist; otherwise the default locations are
/// searched and a missing file means built-in defaults.
fn load_config(cli: &Cli) -> Result<LoadedAppConfig> {
    match &cli.config {
        Some(path) => Ok(LoadedAppConfig {
            config: AppConfig::from_path(path)?,
            source: Some(path.clone()),
        }),
        None => AppConfig::load_with_source(&[PathBuf::from(DEFAULT_CONFIG_PATH)]),
    }
}

async fn interrupted() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for ctrl-c; running for the full duration");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli)?;
    let mut config = loaded.config;
    apply_overrides(&cli, &mut config);
    init_tracing(SERVICE_NAME, &config.logging)?;

    if let Err(err) = config.validate() {
        error!(error = %err, "invalid configuration");
        return Err(err).context("refusing to start delivery");
    }
    info!(
        source = ?loaded.source,
        host = %config.thingsboard.host,
        tick_interval_secs = config.simulation.tick_interval.as_secs(),
        run_duration_secs = config.simulation.run_duration.as_secs(),
        seed = ?config.simulation.seed,
        "configuration loaded"
    );

    let generator = match config.simulation.seed {
        Some(seed) => RandomWalkGenerator::seeded(seed)?,
        None => RandomWalkGenerator::from_entropy()?,
    };
    let publisher = HttpTelemetryPublisher::from_config(&config.thingsboard)?;
    let scheduler = TickScheduler::new(
        generator,
        Arc::new(publisher),
        config.simulation.tick_interval,
    );

    let controller = DeliveryController::new();
    let summary = run_delivery_until(
        &controller,
        scheduler,
        config.simulation.run_duration,
        interrupted(),
    )
    .await?;

    if summary.publish_failures > 0 {
        warn!(
            failures = summary.publish_failures,
            ticks = summary.ticks,
            "some readings were not delivered"
        );
    }
    Ok(())
}
