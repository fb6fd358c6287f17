//! Tracing initialization logic.

use crate::{config::Config, feed::FeedSource, util};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber on stderr, filtered by `cfg.log_filter`.
/// `cfg.log_json` switches the fmt layer to one JSON object per record.
pub fn init_tracing(cfg: &Config) {
    let text_layer = (!cfg.log_json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.verbose)
            .with_level(true)
    });
    let json_layer = cfg.log_json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false)
    });

    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter '{}': {e}", cfg.log_filter);
        EnvFilter::new("hist_listener=info")
    });

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(filter)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_ts = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "hist-listener starting"
    );

    let source = match &cfg.source {
        FeedSource::Stdin => "<stdin>".to_string(),
        FeedSource::Tcp(addr) => addr.clone(),
        FeedSource::Zmq(endpoint) => endpoint.clone(),
    };
    info!(source = %source,
        topic = %cfg.topic,
        flush_interval = %util::format_duration(cfg.flush_interval),
        json = cfg.json,
        plot_width = cfg.plot_width,
        verbose = cfg.verbose,
        log_filter = %cfg.log_filter,
        log_json = cfg.log_json,
        "Configuration loaded");
}
