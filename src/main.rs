// Main application entry point.
// Orchestrates command-line parsing, the feed reader and signal threads,
// the single-threaded update/flush loop, and shutdown reporting.

use anyhow::Context;
use colored::*;
use crossbeam_channel::{bounded, select};
use signal_hook::consts::signal::*;
use signal_hook::iterator::Signals;
use std::io;
use std::process::exit;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use hist_listener::cli;
use hist_listener::config::Config;
use hist_listener::feed::{self, FeedEvent};
use hist_listener::flush::FlushScheduler;
use hist_listener::monitor::Monitor;
use hist_listener::render::{JsonRenderer, Renderer, TextRenderer};
use hist_listener::telemetry;

/// Why the main loop stopped.
enum Shutdown {
    Signal(i32),
    FeedClosed,
}

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();
    let cfg = Config::from(&args);
    telemetry::init_tracing(&cfg);

    let feed = match feed::open_source(&cfg.source, &cfg.topic) {
        Ok(feed) => feed,
        Err(e) => {
            eprintln!("{} {}", "Error opening feed:".red().bold(), e);
            exit(2);
        }
    };

    // Reader thread: blocks on the feed so the main loop can also wait on signals.
    let (feed_tx, feed_rx) = bounded::<FeedEvent>(1024);
    let _reader = feed::spawn_reader(feed, feed_tx).context("spawning feed reader thread")?;

    // Signal thread: turns SIGINT/SIGTERM/SIGQUIT into a shutdown notice.
    let (sig_tx, sig_rx) = bounded::<i32>(1);
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT]).context("installing signal handlers")?;
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                let _ = sig_tx.send(sig);
            }
        })
        .context("spawning signal thread")?;

    let renderer: Box<dyn Renderer> = if cfg.json {
        Box::new(JsonRenderer::new(io::stdout()))
    } else {
        Box::new(TextRenderer::new(io::stdout(), cfg.plot_width))
    };
    let mut monitor = Monitor::new(
        cfg.topic.clone(),
        FlushScheduler::new(cfg.flush_interval),
        renderer,
    );

    // Main loop: one message at a time, flush checked on arrival only.
    let reason = loop {
        select! {
            recv(sig_rx) -> sig => break Shutdown::Signal(sig.unwrap_or(SIGTERM)),
            recv(feed_rx) -> event => match event {
                Ok(FeedEvent::Message(parts)) => {
                    let outcome = monitor.handle(&parts, Instant::now());
                    debug!(?outcome, "Message handled");
                }
                Ok(FeedEvent::Closed) | Err(_) => break Shutdown::FeedClosed,
            },
        }
    };

    match reason {
        Shutdown::Signal(sig) => info!(signal = sig, "Received signal, shutting down"),
        Shutdown::FeedClosed => info!("Feed closed, shutting down"),
    }

    let stats = monitor.stats();
    if stats.messages_rejected > 0 || stats.flushes_skipped > 0 {
        warn!(
            rejected = stats.messages_rejected,
            skipped_flushes = stats.flushes_skipped,
            "Some messages or flushes were dropped"
        );
    }
    info!(
        received = stats.messages_received,
        decoded = stats.messages_decoded,
        filtered = stats.messages_filtered,
        channels = monitor.store().len(),
        flushes = stats.flushes_rendered,
        "Final statistics"
    );

    Ok(())
}
