use crate::cli::Args;
use crate::feed::FeedSource;
use std::time::Duration;

/// Runtime configuration resolved from the command line and environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub source:         FeedSource,
    pub topic:          String,
    pub flush_interval: Duration,
    pub json:           bool,
    pub plot_width:     usize,
    pub verbose:        bool,
    pub log_filter:     String,
    pub log_json:       bool,
}

impl Config {
    /// Resolves the log filter: RUST_LOG wins, then `--verbose`, then `--log-filter`.
    fn resolve_log_filter(rust_log: Option<String>, verbose: bool, flag: &str) -> String {
        match rust_log {
            Some(filter) if !filter.trim().is_empty() => filter,
            _ if verbose => "hist_listener=debug".to_string(),
            _ => flag.to_string(),
        }
    }

    fn resolve_source(a: &Args) -> FeedSource {
        match (&a.zmq, &a.connect) {
            (Some(endpoint), _) => FeedSource::Zmq(endpoint.clone()),
            (None, Some(addr)) => FeedSource::Tcp(addr.clone()),
            (None, None) => FeedSource::Stdin,
        }
    }

    pub fn from_args_and_env(a: &Args, rust_log: Option<String>) -> Self {
        Self {
            source:         Self::resolve_source(a),
            topic:          a.topic.clone(),
            flush_interval: a.flush_interval,
            json:           a.json,
            plot_width:     a.plot_width,
            verbose:        a.verbose,
            log_filter:     Self::resolve_log_filter(rust_log, a.verbose, &a.log_filter),
            log_json:       a.log_json,
        }
    }
}

impl From<&Args> for Config {
    fn from(a: &Args) -> Self {
        Self::from_args_and_env(a, std::env::var("RUST_LOG").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["hist-listener"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults() {
        let cfg = Config::from_args_and_env(&args(&[]), None);
        assert_eq!(cfg.source, FeedSource::Stdin);
        assert_eq!(cfg.topic, "energy_from_filt_value");
        assert_eq!(cfg.flush_interval, Duration::from_secs(5));
        assert_eq!(cfg.plot_width, 60);
        assert_eq!(cfg.log_filter, "hist_listener=info");
        assert!(!cfg.json);
        assert!(!cfg.log_json);
    }

    #[test]
    fn flags_map_through() {
        let cfg = Config::from_args_and_env(
            &args(&["--connect", "daq:5555", "--flush-interval", "250ms", "--json", "-v"]),
            None,
        );
        assert_eq!(cfg.source, FeedSource::Tcp("daq:5555".into()));
        assert_eq!(cfg.flush_interval, Duration::from_millis(250));
        assert!(cfg.json);
        assert_eq!(cfg.log_filter, "hist_listener=debug");
    }

    #[test]
    fn rust_log_overrides_flags() {
        let cfg = Config::from_args_and_env(&args(&["-v"]), Some("warn".into()));
        assert_eq!(cfg.log_filter, "warn");
        let cfg = Config::from_args_and_env(&args(&[]), Some("  ".into()));
        assert_eq!(cfg.log_filter, "hist_listener=info");
    }

    #[test]
    fn zmq_endpoint_selects_zmq_source() {
        let cfg = Config::from_args_and_env(&args(&["--zmq", "tcp://daq:5555"]), None);
        assert_eq!(cfg.source, FeedSource::Zmq("tcp://daq:5555".into()));
    }

    #[test]
    fn zmq_and_connect_conflict() {
        let err = Args::try_parse_from(["hist-listener", "--zmq", "tcp://a:1", "--connect", "a:1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn log_json_flag() {
        let cfg = Config::from_args_and_env(&args(&["--log-json"]), None);
        assert!(cfg.log_json);
    }
}
