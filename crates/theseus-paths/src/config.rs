//! Resolver configuration.

use serde::{Deserialize, Serialize};

/// The order in which path templates are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrder {
    /// Contract declaration order. The first template that matches wins.
    #[default]
    Declared,
    /// Fewer placeholders first, then longer templates. Ties keep
    /// declaration order.
    Specificity,
}

impl MatchOrder {
    /// Parses `declared` or `specificity` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "declared" => Some(Self::Declared),
            "specificity" => Some(Self::Specificity),
            _ => None,
        }
    }
}

/// Configuration for path resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Template iteration order.
    pub match_order: MatchOrder,
    /// Report path parameters whose value does not fit the declared type as
    /// their own errors, ahead of the path-not-found error.
    pub report_parameter_types: bool,
}

impl ResolverConfig {
    /// Specificity ordering with parameter type errors reported.
    pub fn strict() -> Self {
        Self {
            match_order: MatchOrder::Specificity,
            report_parameter_types: true,
        }
    }

    /// Sets the match order.
    pub fn with_match_order(mut self, match_order: MatchOrder) -> Self {
        self.match_order = match_order;
        self
    }

    /// Enables or disables parameter type errors.
    pub fn with_parameter_type_errors(mut self, enabled: bool) -> Self {
        self.report_parameter_types = enabled;
        self
    }
}
