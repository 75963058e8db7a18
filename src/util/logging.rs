//! Logging initialization
//!
//! All output goes through the `tracing` ecosystem, installed exactly once
//! per process. The crate-level filter is derived from CLI flags or
//! `BOMSCOUT_LOG_LEVEL`; an explicit `RUST_LOG` always wins. Records are
//! written to stderr so BOM output on stdout stays clean.
//!
//! # Example
//!
//! ```no_run
//! use bomscout::util::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::default());
//! tracing::info!("Scan started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Subscriber settings: the minimum level for this crate's events, and
/// whether records render as JSON lines or human-readable text.
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    pub level: Level,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
        }
    }
}

/// Installs the global subscriber. Later calls are no-ops, so library
/// consumers and tests may call this freely.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter = filter.add_directive(
                format!("bomscout={}", config.level)
                    .parse()
                    .expect("level directive is well-formed"),
            );
        }

        let registry = tracing_subscriber::registry().with(filter);
        let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
        if config.json {
            registry.with(layer.json()).init();
        } else {
            registry.with(layer).init();
        }
    });
}

/// Resolves the level from CLI flags, then `BOMSCOUT_LOG_LEVEL`, then INFO,
/// and installs the subscriber. JSON rendering is opt-in via
/// `BOMSCOUT_LOG_JSON=true`.
pub fn init_for_cli(level_flag: Option<&str>, verbose: bool, quiet: bool) {
    let level = match level_flag {
        Some(flag) => parse_level(flag),
        None if verbose => Level::DEBUG,
        None if quiet => Level::ERROR,
        None => env::var("BOMSCOUT_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO),
    };

    let json = env::var("BOMSCOUT_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig { level, json });
}

/// Maps a level name to a [`Level`], falling back to INFO (with a note on
/// stderr) for anything unrecognized.
pub fn parse_level(value: &str) -> Level {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("Unrecognized log level '{other}'; using info. Valid levels: trace, debug, info, warn, error");
            Level::INFO
        }
    }
}
