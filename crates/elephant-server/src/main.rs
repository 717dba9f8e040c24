//! Elephant simulation server binary.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 24h sessions, 100 concurrent sessions, sweep every 5 minutes
//! elephant-server
//!
//! # Short-lived sessions with shared-boundary ranges
//! elephant-server --session-expiry-hours 1 --range-adjacency shared-boundary
//! ```

use clap::{Parser, ValueEnum};
use elephant_core::RangeAdjacency;
use elephant_server::{Server, SimulationConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How consecutive scenario ranges must meet
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AdjacencyArg {
    /// `[0, 3600]` is followed by `[3601, ...]`
    Inclusive,
    /// `[0, 3600]` is followed by `[3600, ...]`
    SharedBoundary,
}

impl From<AdjacencyArg> for RangeAdjacency {
    fn from(arg: AdjacencyArg) -> Self {
        match arg {
            AdjacencyArg::Inclusive => Self::Inclusive,
            AdjacencyArg::SharedBoundary => Self::SharedBoundary,
        }
    }
}

/// Elephant carbon-intensity simulation server
#[derive(Parser, Debug)]
#[command(name = "elephant-server")]
#[command(about = "Carbon-intensity simulation session server")]
#[command(version)]
struct Args {
    /// Session lifetime in hours
    #[arg(long, default_value = "24")]
    session_expiry_hours: u64,

    /// Maximum timepoints or ranges per scenario
    #[arg(long, default_value = "1000")]
    max_data_points: usize,

    /// Maximum concurrent sessions
    #[arg(long, default_value = "100")]
    max_concurrent_sessions: usize,

    /// Expiry sweep period in minutes
    #[arg(long, default_value = "5")]
    cleanup_interval_minutes: u64,

    /// Access records kept per session
    #[arg(long, default_value = "100")]
    max_history_entries: usize,

    /// Range adjacency rule
    #[arg(long, value_enum, default_value = "inclusive")]
    range_adjacency: AdjacencyArg,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            session_expiry_hours: self.session_expiry_hours,
            max_data_points: self.max_data_points,
            max_concurrent_sessions: self.max_concurrent_sessions,
            cleanup_interval_minutes: self.cleanup_interval_minutes,
            max_history_entries: self.max_history_entries,
            range_adjacency: self.range_adjacency.into(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = args.config();

    tracing::info!("Elephant simulation server starting");
    tracing::info!(
        session_expiry_hours = config.session_expiry_hours,
        max_data_points = config.max_data_points,
        max_concurrent_sessions = config.max_concurrent_sessions,
        cleanup_interval_minutes = config.cleanup_interval_minutes,
        range_adjacency = ?config.range_adjacency,
        "Configuration loaded"
    );

    let server = Server::new(&config)?;

    server.run().await?;

    Ok(())
}
