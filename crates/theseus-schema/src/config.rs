//! Schema validation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the schema validation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Look up the line and column of each failing keyword in the rendered
    /// schema.
    pub locate_failures: bool,
    /// Attach the rendered schema to the error as context.
    pub attach_rendered_schema: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            locate_failures: true,
            attach_rendered_schema: true,
        }
    }
}

impl SchemaConfig {
    /// Failures without locations or context; the cheapest setting.
    pub fn minimal() -> Self {
        Self {
            locate_failures: false,
            attach_rendered_schema: false,
        }
    }
}
