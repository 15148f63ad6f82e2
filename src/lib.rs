// Sentiment Dash Library - Public API

// Re-export error types
pub mod error;
pub use error::{DashError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::sentiment::{DashboardState, LiveEvent, SentimentDistribution, SentimentLabel};

/// Initialize logging.
///
/// `default_level` applies when `RUST_LOG` is not set.
pub fn init_logging(default_level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
