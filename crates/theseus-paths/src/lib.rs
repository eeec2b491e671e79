//! Theseus Paths - request path resolution
//!
//! Given an HTTP method and a request path, find the contract path template
//! and operation that serve it.
//!
//! Templates are tried one at a time. A request path that is byte-identical
//! to a template matches straight away. Otherwise the template and the
//! request must have the same number of segments. Each `{placeholder}`
//! takes the request's segment at that position, and the value has to fit
//! the declared path parameter type. The rebuilt path must then equal the
//! request path once both are lexically cleaned. The first template that
//! matches wins.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use theseus_core::{Contract, Operation, Parameter, PathItem, SchemaType};
//! use theseus_paths::find_path;
//!
//! let contract = Contract::builder("pet-store")
//!     .path(
//!         "/pets/{petId}",
//!         PathItem::new()
//!             .parameter(Parameter::path("petId").with_type(SchemaType::Integer))
//!             .with_operation(&Method::GET, Operation::new().with_id("getPet")),
//!     )
//!     .build();
//!
//! let found = find_path(&Method::GET, "/pets/42", &contract);
//! assert_eq!(found.template, "/pets/{petId}");
//! assert_eq!(found.path_params["petId"], "42");
//!
//! let missed = find_path(&Method::GET, "/pets/rex", &contract);
//! assert!(missed.operation.is_none());
//! assert_eq!(missed.errors[0].message, "Path '/pets/rex' not found");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod resolver;
pub mod template;

pub use config::{MatchOrder, ResolverConfig};
pub use resolver::{find_path, PathMatch, PathResolver};
pub use template::{canonical_join, split_segments, PathTemplate, Segment};
