//! Logging utilities and structured logging support

use std::sync::Once;

use crate::core::config::LoggingConfig;

pub use log::{debug, error, info, trace, warn};

static INIT: Once = Once::new();

/// Initialize the logging system
///
/// The filter comes from `config.filter` when set, then from `RUST_LOG`,
/// and finally defaults to `info`. Only the first call installs a logger.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        // A logger may already be installed by an embedding application.
        if builder.try_init().is_err() {
            log::debug!("global logger already installed, keeping it");
        } else {
            log::debug!("logging initialized");
        }
    });
}
