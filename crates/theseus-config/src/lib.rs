//! Layered configuration for Theseus.
//!
//! Configuration is assembled from, in increasing priority:
//! - built-in defaults (or the [`TheseusConfig::development`] preset)
//! - a TOML or JSON file
//! - environment variables named `THESEUS__SECTION__KEY`
//!
//! # Configuration File Format
//!
//! ```toml
//! [resolver]
//! match_order = "declared"        # or "specificity"
//! report_parameter_types = false
//!
//! [schema]
//! locate_failures = true
//! attach_rendered_schema = true
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"                 # or "pretty"
//! include_target = true
//! ```
//!
//! Unknown sections are rejected.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::TheseusConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};

pub use theseus_paths::{MatchOrder, ResolverConfig};
pub use theseus_schema::SchemaConfig;
pub use theseus_telemetry::{LogConfig, LogFormat};
