//! # Theseus
//!
//! Contract-driven request path resolution and payload validation.
//!
//! Theseus takes an OpenAPI 3 contract and answers two questions about an
//! incoming request:
//!
//! - which path template and operation does `METHOD /some/path` belong to?
//! - does the JSON body conform to that operation's request schema?
//!
//! Both answers come back as lists of structured, locatable
//! [`ValidationError`]s rather than as `Err` values.
//!
//! ```text
//!  contract.yaml ──► ContractLoader ──► Contract ──► PathResolver ─┐
//!                                                                  │
//!  GET /pets/42 ───────────────────────────────────► find_path ◄───┘
//!                                                        │
//!  body bytes ──────────────────► SchemaValidator ◄── operation
//! ```
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use theseus::{ContractLoader, Theseus, TheseusConfig};
//!
//! let contract = ContractLoader::from_yaml(r#"
//! openapi: 3.0.3
//! info:
//!   title: Pets
//!   version: 1.0.0
//! paths:
//!   /pets/{petId}:
//!     get:
//!       operationId: getPet
//!       parameters:
//!         - name: petId
//!           in: path
//!           required: true
//!           schema:
//!             type: integer
//! "#).unwrap();
//!
//! let theseus = Theseus::new(contract, &TheseusConfig::default());
//! let resolution = theseus.resolve(&Method::GET, "/pets/42");
//! assert_eq!(resolution.operation_id.as_deref(), Some("getPet"));
//! assert_eq!(resolution.path_params["petId"], "42");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod service;

pub use service::{Resolution, Theseus};

// Re-export the component crates
pub use theseus_config as config;
pub use theseus_core as core;
pub use theseus_paths as paths;
pub use theseus_schema as schema;

pub use theseus_config::{ConfigLoader, TheseusConfig};
pub use theseus_core::{
    Contract, ContractError, ContractLoader, ContractResult, SpecLocation, ValidationError,
    ValidationType,
};
pub use theseus_paths::{find_path, MatchOrder, PathMatch, PathResolver, ResolverConfig};
pub use theseus_schema::{validate_schema, SchemaConfig, SchemaValidator};
