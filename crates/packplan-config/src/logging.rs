//! Optional tracing subscriber setup.
//!
//! The library only emits `tracing` events. Hosts that want this crate to
//! install a subscriber enable the `logging` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use packplan_config::{logging::init_logger, Settings};
//!
//! init_logger(&Settings::default()).ok();
//! ```

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::{LogFormat, Settings};

const DEFAULT_FILTER: &str = "packplan_config=info";

/// Filter derived from settings, falling back to `RUST_LOG`, then `info`.
pub fn filter_for(settings: &Settings) -> EnvFilter {
    match settings.log_level {
        Some(level) => EnvFilter::new(format!("packplan_config={}", level.as_filter())),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber described by `settings`.
///
/// Fails if a global subscriber is already set.
pub fn init_logger(settings: &Settings) -> Result<(), TryInitError> {
    init_logger_with_filter(filter_for(settings), settings.log_format)
}

pub fn init_logger_with_filter(filter: EnvFilter, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(false).compact())
            .try_init(),
        LogFormat::Full => registry.with(fmt::layer()).try_init(),
    }
}
