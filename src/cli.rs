use clap::Parser;
use std::time::Duration;

/// Live monitor for per-channel energy histograms.
/// Reads six-part histogram updates from stdin or a TCP endpoint (one JSON string
/// array per line), or from a ZeroMQ publisher, and periodically prints the
/// combined spectrum to stdout.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TCP endpoint (host:port) to read the feed from instead of stdin.
    #[arg(long, value_name = "ADDR", conflicts_with = "zmq")]
    pub connect: Option<String>,

    /// ZeroMQ endpoint to subscribe to (e.g., "tcp://daq-host:5555").
    /// Requires a build with the `zmq` feature.
    #[arg(long, value_name = "ENDPOINT")]
    pub zmq: Option<String>,

    /// Subscription prefix. Messages whose topic does not start with it are ignored.
    #[arg(long, default_value = crate::feed::DEFAULT_TOPIC, value_name = "PREFIX")]
    pub topic: String,

    /// Minimum time between flushes (e.g., "5s", "500ms"). Flushes are only
    /// checked when a message arrives.
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub flush_interval: Duration,

    /// Emit one JSON object per flush instead of the text plot.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Width in columns of the longest bar in the text plot.
    #[arg(long, default_value_t = crate::render::DEFAULT_PLOT_WIDTH, value_name = "N")]
    pub plot_width: usize,

    /// Enable verbose logging (debug level for this crate, log targets shown).
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Log filter directive. Overridden by RUST_LOG when set.
    #[arg(long, default_value = "hist_listener=info", value_name = "FILTER")]
    pub log_filter: String,

    /// Write log records to stderr as JSON objects, one per line.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_json: bool,
}

/// Parses command line arguments using clap.
pub fn parse_args() -> Args {
    Args::parse()
}
