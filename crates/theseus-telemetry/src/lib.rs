//! Theseus Telemetry - logging setup
//!
//! Library crates only emit `tracing` events. Binaries call [`init_logging`]
//! once at startup to install a `tracing-subscriber` registry with an
//! [`EnvFilter`](tracing_subscriber::EnvFilter) and a JSON or pretty `fmt`
//! layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
