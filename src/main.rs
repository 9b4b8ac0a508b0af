//! CLI entry point for bus_status.
//!
//! Looks up the buses heading to one of the known stops and prints how many
//! stops away each one is and where it currently is.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use bus_status::{
    config::{
        self, BusTimeConfig, DEFAULT_BASE_URL, DEFAULT_BUS_LINE, DEFAULT_OPERATOR, OPERATORS,
        StopQuery,
    },
    error::exit_code_for,
    infra::bustime::BusTimeClient,
    output::{MissingVehiclePolicy, write_report},
    stops::{self, Stop},
};
use clap::Parser;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bus_status")]
#[command(about = "Use the BusTime API to get information on nearby buses.", long_about = None)]
struct Cli {
    /// Name of the bus line, e.g. Q18
    #[arg(short = 'l', long = "bus_line", default_value = DEFAULT_BUS_LINE)]
    bus_line: String,

    #[arg(short, long, default_value = DEFAULT_OPERATOR, help = operator_help())]
    operator: String,

    #[arg(short, long, value_parser = config::parse_stop, help = stop_help())]
    stop: Stop,

    /// What to do when a bus's current location cannot be found
    #[arg(long, value_enum, default_value_t = MissingVehiclePolicy::Skip)]
    on_missing_vehicle: MissingVehiclePolicy,

    /// BusTime SIRI API root (falls back to BUSTIME_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds; no timeout when omitted
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn operator_help() -> String {
    format!("Name of the bus operator. Options: {}", OPERATORS.join(", "))
}

fn stop_help() -> String {
    format!(
        "The stop to get data for (by number).\nOptions:\n{}",
        stops::help_listing()
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let _file_guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Run failed");
            eprintln!("{e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Logging setup: colored stderr, plus a JSON rolling log file when
/// `LOG_FILE_PATH` is set.
fn init_logging() -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("warn".parse()?));

    let (json_layer, guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let log_dir = Path::new(&log_file_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let log_file_name = Path::new(&log_file_path)
                .file_name()
                .unwrap_or(OsStr::new("bus_status.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?),
                );
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()?;

    Ok(guard)
}

/// Resolves configuration from the environment and flags, then prints the report.
#[tracing::instrument(skip_all, fields(stop = cli.stop.name, bus_line = %cli.bus_line, operator = %cli.operator))]
async fn run(cli: Cli) -> Result<()> {
    let api_key = config::resolve_api_key(std::env::var("API_KEY").ok())?;
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("BUSTIME_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let config = BusTimeConfig::new(
        &base_url,
        api_key,
        cli.timeout_secs.map(Duration::from_secs),
    )?;
    debug!(?config, "Configuration resolved");

    let query = StopQuery::new(cli.stop, &cli.operator, &cli.bus_line);
    let client = BusTimeClient::new(&config)?;

    let mut stdout = io::stdout().lock();
    write_report(&client, &query, cli.on_missing_vehicle, &mut stdout).await
}
