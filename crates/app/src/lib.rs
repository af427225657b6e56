//! Runnable wiring of the payment domain.
//!
//! Loads [`Config`] from the environment, installs structured logging and
//! drives a payment through its lifecycle with a live projection following
//! the event log.

pub mod config;
pub mod demo;
pub mod error;

pub use config::{Config, LogFormat};
pub use demo::DemoReport;
pub use error::AppError;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global tracing subscriber described by `config`.
///
/// An invalid filter directive falls back to `info`.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
