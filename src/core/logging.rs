//! Logging initialization
//!
//! The library only emits through the `log` facade: template loads and
//! unloads at `info`, skipped files and instructions at `warn`, reseeds and
//! placements at `debug`. Binaries decide whether to install a logger.

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Initialize env_logger with the `info` default filter.
///
/// Override with the RUST_LOG environment variable.
///
/// # Example
/// ```
/// infobjects::core::logging::init();
/// log::info!("Loaded 3 IWGOs");
/// ```
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize env_logger with `filter` unless RUST_LOG says otherwise.
///
/// Calling this more than once keeps the first logger.
pub fn init_with_filter(filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .try_init();
}
