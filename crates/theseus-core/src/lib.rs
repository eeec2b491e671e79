//! Theseus Core - contract model and validation errors
//!
//! This crate holds the types every other Theseus crate speaks:
//!
//! - [`Contract`] - an ordered map of path templates to [`PathItem`]s, each
//!   carrying per-method [`Operation`]s and shared [`Parameter`]s
//! - [`ContractLoader`] - reads OpenAPI 3 documents (JSON or YAML) into a
//!   [`Contract`], resolving local `$ref`s and recording source positions
//! - [`ValidationError`] - the structured, locatable error produced by path
//!   resolution and schema validation
//! - [`SourceIndex`] - best-effort line/column lookup for JSON pointer paths
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use theseus_core::{Contract, Operation, Parameter, PathItem, SchemaType};
//!
//! let contract = Contract::builder("pet-store")
//!     .version("1.0.0")
//!     .path(
//!         "/pets/{petId}",
//!         PathItem::new()
//!             .parameter(Parameter::path("petId").with_type(SchemaType::Integer))
//!             .with_operation(&Method::GET, Operation::new().with_id("getPet")),
//!     )
//!     .build();
//!
//! let item = contract.path_item("/pets/{petId}").unwrap();
//! assert!(item.operation(&Method::GET).is_some());
//! assert!(item.operation(&Method::POST).is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;
pub mod error;
pub mod loader;
pub mod locate;

pub use contract::{
    Contract, ContractBuilder, Operation, Parameter, ParameterLocation, PathItem,
    SchemaDefinition, SchemaType, SUPPORTED_METHODS,
};
pub use error::{
    ContractError, ContractResult, SchemaValidationFailure, ValidationError, ValidationType,
};
pub use loader::{ContractLoader, DocumentFormat};
pub use locate::{locate, split_pointer, SourceIndex, SpecLocation};
