//! handwash-coach — run the coach against a recorded script or the
//! built-in synthetic demo.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use handwash_coach::driver::demo::DemoSource;
use handwash_coach::driver::scheduler::{self, Pipeline, SchedulerConfig};
use handwash_coach::driver::{ObservationSource, ScriptSource};
use handwash_coach::speech::LoggingSpeech;
use handwash_coach::{Coach, CoachConfig, SnapshotPublisher};

#[derive(Parser, Debug)]
#[command(name = "handwash-coach", about = "Hand-washing technique coach")]
struct Cli {
    /// Config file (s-expression plist of threshold overrides)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay observations from a script file, one plist per line
    #[arg(long, conflicts_with = "demo")]
    script: Option<PathBuf>,

    /// Run the synthetic demo session (default when no script is given)
    #[arg(long)]
    demo: bool,

    /// Tick period in milliseconds
    #[arg(long, default_value_t = 66)]
    tick_ms: u64,

    /// Overlay canvas resolution, WxH
    #[arg(long, default_value = "1280x720")]
    resolution: String,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Print the active config and exit
    #[arg(long)]
    print_config: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handwash-coach {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handwash_coach=info".into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => CoachConfig::load(path)?,
        None => CoachConfig::default(),
    };

    if cli.print_config {
        println!("{}", config.to_sexp());
        return Ok(());
    }

    let (width, height) = SchedulerConfig::parse_resolution(&cli.resolution)
        .with_context(|| format!("invalid resolution: {} (expected WxH)", cli.resolution))?;

    info!("handwash-coach v{} starting", env!("CARGO_PKG_VERSION"));

    let source: Box<dyn ObservationSource> = match &cli.script {
        Some(path) if !cli.demo => Box::new(ScriptSource::load(path)?),
        _ => Box::new(DemoSource::default()),
    };
    info!("observation source: {}", source.name());

    let sched = SchedulerConfig {
        tick_ms: cli.tick_ms,
        width,
        height,
        exit_after: cli.exit_after.map(Duration::from_secs),
        ..Default::default()
    };

    let pipeline = Pipeline::new(
        Coach::new(config),
        source,
        Box::new(LoggingSpeech::default()),
        SnapshotPublisher::new(),
        width,
        height,
    );

    let summary = scheduler::run(pipeline, &sched)?;
    println!("{}", summary.to_sexp());
    Ok(())
}
