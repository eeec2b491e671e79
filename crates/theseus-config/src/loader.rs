//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use theseus_paths::MatchOrder;
use theseus_telemetry::LogFormat;

use crate::{ConfigError, TheseusConfig};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "THESEUS";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use theseus_config::ConfigLoader;
///
/// # fn main() -> Result<(), theseus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("theseus.toml")?
///     .with_env_prefix("THESEUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: TheseusConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use theseus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TheseusConfig::development();
        self
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read, has
    /// an unsupported extension, or does not parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `toml` or `json` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// ```
    /// use theseus_config::ConfigLoader;
    /// use theseus_paths::MatchOrder;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[resolver]\nmatch_order = \"specificity\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.resolver.match_order, MatchOrder::Specificity);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `THESEUS__RESOLVER__MATCH_ORDER=specificity`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<TheseusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without applying overrides or validating.
    #[must_use]
    pub fn load_unvalidated(self) -> TheseusConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<TheseusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut overrides: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        overrides.sort();

        for (key, value) in overrides {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let boolean = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        match parts.as_slice() {
            ["RESOLVER", "MATCH_ORDER"] => {
                self.config.resolver.match_order = MatchOrder::parse(value).ok_or_else(|| {
                    ConfigError::env_parse_error(key, "expected 'declared' or 'specificity'")
                })?;
            }
            ["RESOLVER", "REPORT_PARAMETER_TYPES"] => {
                self.config.resolver.report_parameter_types = boolean()?;
            }

            ["SCHEMA", "LOCATE_FAILURES"] => {
                self.config.schema.locate_failures = boolean()?;
            }
            ["SCHEMA", "ATTACH_RENDERED_SCHEMA"] => {
                self.config.schema.attach_rendered_schema = boolean()?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = boolean()?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = LogFormat::parse(value).ok_or_else(|| {
                    ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")
                })?;
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                self.config.logging.include_target = boolean()?;
            }
            ["LOGGING", "FILE_LINE_INFO"] => {
                self.config.logging.file_line_info = boolean()?;
            }

            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, TheseusConfig::default());
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"schema": {"locate_failures": false}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.schema.locate_failures);
        assert!(config.schema.attach_rendered_schema);
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[resolver]\nreport_parameter_types = true\n\n[logging]\nlevel = \"warn\""
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(config.resolver.report_parameter_types);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_loader_with_unsupported_file() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        writeln!(file, "level = warn").unwrap();
        assert!(ConfigLoader::new().with_file(file.path()).is_err());
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/theseus.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/theseus.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, TheseusConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_level() {
        let result = ConfigLoader::new()
            .with_string("[logging]\nlevel = \"theseus=deafening\"", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_apply_env_var_resolver() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__RESOLVER__MATCH_ORDER", "Specificity", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__RESOLVER__REPORT_PARAMETER_TYPES", "yes", "TEST")
            .unwrap();
        assert_eq!(loader.config.resolver.match_order, MatchOrder::Specificity);
        assert!(loader.config.resolver.report_parameter_types);
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST").unwrap();
        loader.apply_env_var("TEST__SCHEMA__LOCATE_FAILURES", "false", "TEST").unwrap();
        assert_eq!(loader.config.logging.level, "debug");
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert!(!loader.config.schema.locate_failures);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__RESOLVER__MATCH_ORDER", "random", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__ENABLED", "sometimes", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__SERVER__PORT", "80", "TEST").is_ok());
        assert_eq!(loader.config, TheseusConfig::default());
    }
}
