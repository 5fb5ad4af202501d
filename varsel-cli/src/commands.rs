use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use varsel_config::{GeneratorConfig, VarselConfig};
use varsel_core::events::TelemetryRecord;
use varsel_engine::TelemetryRuntime;
use varsel_generator::TelemetryGenerator;
use varsel_telemetry::EventLogger;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the serving process (generation loop + HTTP/SSE API)
    Serve(ServeArgs),
    /// Run a bounded generation batch and print records as JSON lines
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Configuration file; default hierarchy is config/varsel.yaml
    /// overlaid with VARSEL_* environment variables.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the API listener port.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of iterations; each yields one log and one metric record.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Override the lower delay bound (seconds).
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Override the upper delay bound (seconds).
    #[arg(long)]
    pub max_delay: Option<f64>,
}

pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match args.config {
        Some(path) => VarselConfig::load_from_path(path)?,
        None => VarselConfig::load()?,
    };
    if let Some(port) = args.port {
        config.transport.port = port;
    }

    EventLogger::init(&config.telemetry.log_filter);

    let runtime = TelemetryRuntime::new(config)?;
    runtime.run().await?;
    Ok(())
}

pub async fn run_generate(
    args: GenerateArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Keep stdout clean for the JSON lines.
    EventLogger::init("warn");

    let mut generator_config = GeneratorConfig::default();
    if let Some(min_delay) = args.min_delay {
        generator_config.min_delay_secs = min_delay;
    }
    if let Some(max_delay) = args.max_delay {
        generator_config.max_delay_secs = max_delay;
    }

    let generator = TelemetryGenerator::new(generator_config)?;
    generator.start();
    for _ in 0..args.count {
        generator.run_iteration();
    }
    generator.stop();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while let Some(log) = generator.try_dequeue_log() {
        writeln!(out, "{}", serde_json::to_string(&TelemetryRecord::Log(log))?)?;
    }
    while let Some(metric) = generator.try_dequeue_metric() {
        writeln!(
            out,
            "{}",
            serde_json::to_string(&TelemetryRecord::Metric(metric))?
        )?;
    }
    Ok(())
}
