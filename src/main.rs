//! CLI entry point for the weather station rollup tool.
//!
//! Provides subcommands for the daily climatology comparison, the hourly
//! multi-metric summary, and store maintenance.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_rollup::config::{PipelineArgs, StationConfig};
use weather_rollup::error::WeatherError;
use weather_rollup::infra::{FileSource, RealmFiveClient, S3Publisher};
use weather_rollup::readings::floor_to_hour;
use weather_rollup::services::{Publisher, ReadingSource};
use weather_rollup::store;
use weather_rollup::summaries::pipeline::Run;

#[derive(Parser)]
#[command(name = "weather_rollup")]
#[command(
    about = "Daily climatology and hourly summaries for a weather station",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge fresh readings into the store and write the daily comparison tables
    Daily {
        /// Historical readings store (CSV)
        #[arg(long, default_value = "data/realmfive_weather_full_data.csv")]
        store: PathBuf,

        /// Directory for the summary tables
        #[arg(short, long, default_value = "data")]
        output_dir: PathBuf,

        /// Read readings from a saved JSON payload instead of the station API
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        station: StationConfig,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Reduce one UTC hour of readings to a single summary document
    Hourly {
        /// Any instant inside the hour to summarize (RFC 3339); defaults to the current hour
        #[arg(long)]
        hour: Option<DateTime<Utc>>,

        /// Directory for the summary document
        #[arg(short, long, default_value = "data")]
        output_dir: PathBuf,

        /// Read readings from a saved JSON payload instead of the station API
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        station: StationConfig,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Deduplicate and sort a historical store in place
    Normalize {
        /// Historical readings store (CSV)
        #[arg(long, default_value = "data/realmfive_weather_full_data.csv")]
        store: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weather_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weather_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daily {
            store,
            output_dir,
            input,
            station,
            pipeline,
        } => {
            let config = pipeline.to_config()?;
            let source = reading_source(&station, input)?;
            let publisher = publisher(&station).await;

            let run = Run {
                source: source.as_ref(),
                publisher: publisher.as_ref().map(|p| p as &dyn Publisher),
                config: &config,
                device_id: station.device.as_deref().unwrap_or_default(),
                output_dir: &output_dir,
                key_prefix: &station.s3_prefix,
            };

            let report = run.daily(&store, Utc::now()).await?;
            info!(
                fetched = report.fetched,
                history = report.history,
                rows = report.rows,
                current_days = report.current_days,
                published = report.published.len(),
                "Daily summaries written"
            );
        }
        Commands::Hourly {
            hour,
            output_dir,
            input,
            station,
            pipeline,
        } => {
            let config = pipeline.to_config()?;
            let source = reading_source(&station, input)?;
            let publisher = publisher(&station).await;
            let hour = floor_to_hour(hour.unwrap_or_else(Utc::now));
            info!(hour = %hour, "Summarizing hour (UTC)");

            let run = Run {
                source: source.as_ref(),
                publisher: publisher.as_ref().map(|p| p as &dyn Publisher),
                config: &config,
                device_id: station.device.as_deref().unwrap_or_default(),
                output_dir: &output_dir,
                key_prefix: &station.s3_prefix,
            };

            match run.hourly(hour).await {
                Ok(report) => {
                    info!(
                        path = %report.path.display(),
                        published = ?report.published,
                        "Hourly summary written"
                    );
                }
                Err(e) => {
                    if let Some(WeatherError::NoReadingsForHour(_)) =
                        e.downcast_ref::<WeatherError>()
                    {
                        warn!("No data available for the current hour");
                    }
                    return Err(e);
                }
            }
        }
        Commands::Normalize { store: path } => {
            let before = store::load(&path)?;
            let count_before = before.len();
            let after = before.normalize();
            store::save(&path, &after)?;

            info!(
                path = %path.display(),
                before = count_before,
                after = after.len(),
                dropped = count_before - after.len(),
                "Store normalized"
            );
        }
    }

    Ok(())
}

/// Picks the station API, or a local payload file when `--input` is given.
fn reading_source(
    station: &StationConfig,
    input: Option<PathBuf>,
) -> Result<Box<dyn ReadingSource>> {
    if let Some(path) = input {
        return Ok(Box::new(FileSource::new(path)));
    }

    let api_key = station
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("REALM5_API_KEY must be set (or pass --api-key)"))?;
    if station.device.is_none() {
        return Err(anyhow!(
            "WEATHER_STATION_DEVICE must be set (or pass --device)"
        ));
    }

    let client = RealmFiveClient::new(&station.base_url, api_key)
        .context("failed to build station API client")?;
    Ok(Box::new(client))
}

/// Builds an S3 publisher when a bucket is configured.
async fn publisher(station: &StationConfig) -> Option<S3Publisher> {
    match station.s3_bucket.as_deref() {
        Some(bucket) if !bucket.is_empty() => {
            info!(bucket, gzip = station.gzip, "S3 upload enabled");
            Some(S3Publisher::from_env(bucket, station.gzip).await)
        }
        _ => {
            info!("S3 bucket not specified, skipping upload");
            None
        }
    }
}
