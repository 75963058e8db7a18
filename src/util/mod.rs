//! Shared utilities

pub mod logging;

pub use logging::{init_for_cli, init_logging, parse_level, LoggingConfig};
