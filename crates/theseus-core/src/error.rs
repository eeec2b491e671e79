//! Error types.
//!
//! [`ValidationError`] is the value-level result of checking a request or a
//! payload against a contract; it is returned in lists and never aborts a
//! caller. [`ContractError`] covers failures to load a contract at all.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locate::SpecLocation;

/// Hint attached to schema validation failures.
pub const HOW_TO_FIX_INVALID_SCHEMA: &str =
    "Ensure that the object being submitted, matches the schema correctly";

/// Hint attached to a request body that could not be decoded.
pub const HOW_TO_FIX_INVALID_PAYLOAD: &str =
    "Ensure the request body is well-formed JSON";

/// Hint attached to a path parameter that should have been numeric.
pub const HOW_TO_FIX_PARAM_INVALID_NUMBER: &str =
    "Convert the value into a number, or check the path for typos";

/// Hint attached to a path parameter that should not have been numeric.
pub const HOW_TO_FIX_PARAM_INVALID_STRING: &str =
    "Use a non-numeric value, or declare the parameter as a number in the contract";

/// Result type for contract loading.
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors that can occur while loading a contract document.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The contract file could not be read.
    #[error("failed to read contract file: {path}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error.
    #[error("failed to parse JSON contract: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML contract: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document format could not be determined or is not supported.
    #[error("unsupported contract format: {0}")]
    UnsupportedFormat(String),

    /// A `$ref` points outside the document or at nothing.
    #[error("unresolved reference: {reference}")]
    UnresolvedReference {
        /// The reference as written in the document.
        reference: String,
    },

    /// A parameter definition is missing a required field or has a bad value.
    #[error("invalid parameter under '{path}': {reason}")]
    InvalidParameter {
        /// Path template the parameter was declared under.
        path: String,
        /// Explanation of the problem.
        reason: String,
    },
}

impl ContractError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates an unresolved reference error.
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The family a [`ValidationError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationType {
    /// Request path resolution and path parameters.
    Path,
    /// Payload validation against a schema.
    Schema,
}

impl ValidationType {
    /// Returns the tag as written in serialized errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failure reported by the schema engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaValidationFailure {
    /// What the engine said went wrong.
    pub reason: String,
    /// Keyword location inside the schema (a JSON pointer).
    pub location: String,
    /// Position of the keyword in the rendered schema.
    pub spec_location: SpecLocation,
}

/// A structured, locatable validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error family.
    pub validation_type: ValidationType,
    /// Finer-grained tag within the family (e.g. `missing`, `number`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_sub_type: Option<String>,
    /// Short human message.
    pub message: String,
    /// Longer explanation.
    pub reason: String,
    /// Suggested remedy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_to_fix: Option<String>,
    /// Where in the contract the violated definition lives.
    pub spec_location: SpecLocation,
    /// Nested schema failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_validation_errors: Vec<SchemaValidationFailure>,
    /// Extra material for the reader, such as the rendered schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ValidationError {
    /// Creates an error with an unknown location and no extras.
    pub fn new(
        validation_type: ValidationType,
        message: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            validation_type,
            validation_sub_type: None,
            message: message.into(),
            reason: reason.into(),
            how_to_fix: None,
            spec_location: SpecLocation::UNKNOWN,
            schema_validation_errors: Vec::new(),
            context: None,
        }
    }

    /// The error reported when no template and method combination matches.
    pub fn path_missing(request_path: &str) -> Self {
        Self::new(
            ValidationType::Path,
            format!("Path '{request_path}' not found"),
            format!(
                "The request contains a path of '{request_path}' \
                 however that path does not exist in the specification"
            ),
        )
        .with_sub_type("missing")
    }

    /// Sets the subtype tag.
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.validation_sub_type = Some(sub_type.into());
        self
    }

    /// Sets the how-to-fix hint.
    pub fn with_how_to_fix(mut self, hint: impl Into<String>) -> Self {
        self.how_to_fix = Some(hint.into());
        self
    }

    /// Sets the source location.
    pub fn at(mut self, location: SpecLocation) -> Self {
        self.spec_location = location;
        self
    }

    /// Attaches nested schema failures.
    pub fn with_failures(mut self, failures: Vec<SchemaValidationFailure>) -> Self {
        self.schema_validation_errors = failures;
        self
    }

    /// Attaches context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns true if this error has the given type and subtype.
    pub fn is(&self, validation_type: ValidationType, sub_type: &str) -> bool {
        self.validation_type == validation_type
            && self.validation_sub_type.as_deref() == Some(sub_type)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if self.spec_location.is_known() {
            write!(f, " (line {})", self.spec_location)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
