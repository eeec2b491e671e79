//! Theseus Schema - payload validation against contract schemas
//!
//! A thin adapter over the `jsonschema` engine. A failed validation turns
//! into a single [`ValidationError`](theseus_core::ValidationError) that
//! nests every engine failure, each with the keyword path that failed and,
//! when it can be found, its line and column in the schema rendered as
//! YAML.
//!
//! ```
//! use serde_json::json;
//! use theseus_core::SchemaDefinition;
//! use theseus_schema::validate_schema;
//!
//! let schema = SchemaDefinition::from_value(json!({
//!     "type": "object",
//!     "required": ["name"]
//! }));
//!
//! let (valid, errors) = validate_schema(&schema, br#"{"name": "Ada"}"#);
//! assert!(valid && errors.is_empty());
//!
//! let (valid, errors) = validate_schema(&schema, b"{}");
//! assert!(!valid);
//! assert_eq!(errors[0].schema_validation_errors[0].location, "/required");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod validator;

pub use config::SchemaConfig;
pub use validator::{locate_keyword, validate_schema, SchemaValidator};
