use crate::batch::{run_batch, BatchArgs};
use crate::estimate::{run_estimate, EstimateArgs};
use crate::health::run_health;
use crate::render::render_locations;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tasador::config::AppConfig;
use tasador::error::AppError;
use tasador::telemetry;
use tasador::workflows::valuation::HttpPredictionClient;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tasador",
    about = "Estimate property prices with the remote prediction service",
    version
)]
pub(crate) struct Cli {
    /// Override the configured prediction endpoint
    #[arg(long, global = true)]
    pub(crate) endpoint: Option<String>,
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Request a single estimate (default command)
    Estimate(EstimateArgs),
    /// Estimate every row of a CSV file
    Batch(BatchArgs),
    /// Check that the prediction service is up and has a model loaded
    Health,
    /// List the supported locations
    Locations,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Estimate(EstimateArgs::default()));

    if let Command::Locations = command {
        print!("{}", render_locations());
        return Ok(());
    }

    let mut config = AppConfig::load()?;
    if let Some(endpoint) = cli.endpoint.as_deref() {
        config.override_endpoint(endpoint)?;
    }

    telemetry::init(&config.telemetry, cli.verbose)?;
    info!(?config.environment, endpoint = %config.prediction.endpoint, "prediction client configured");

    let client = Arc::new(HttpPredictionClient::new(&config.prediction));

    match command {
        Command::Estimate(args) => run_estimate(client, args).await,
        Command::Batch(args) => run_batch(client, args).await,
        Command::Health => run_health(&client).await,
        Command::Locations => Ok(()),
    }
}
