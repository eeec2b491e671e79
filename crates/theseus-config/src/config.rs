//! Top-level configuration.

use serde::{Deserialize, Serialize};
use theseus_paths::ResolverConfig;
use theseus_schema::SchemaConfig;
use theseus_telemetry::LogConfig;

use crate::ConfigError;

/// Complete Theseus configuration.
///
/// ```
/// use theseus_config::TheseusConfig;
/// use theseus_paths::MatchOrder;
///
/// let config = TheseusConfig::default();
/// assert_eq!(config.resolver.match_order, MatchOrder::Declared);
/// assert!(config.schema.locate_failures);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TheseusConfig {
    /// Path resolution.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Schema validation.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LogConfig,
}

impl TheseusConfig {
    /// Pretty debug logging with parameter type errors reported.
    #[must_use]
    pub fn development() -> Self {
        Self {
            resolver: ResolverConfig::default().with_parameter_type_errors(true),
            schema: SchemaConfig::default(),
            logging: LogConfig::development(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level filter does not
    /// parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled {
            theseus_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }
        Ok(())
    }
}
