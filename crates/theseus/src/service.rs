//! The [`Theseus`] coordinator.

use std::path::Path;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use theseus_config::TheseusConfig;
use theseus_core::{Contract, ContractLoader, ContractResult, ValidationError};
use theseus_paths::{PathMatch, PathResolver, ResolverConfig};
use theseus_schema::SchemaValidator;
use tracing::info;

/// Owned summary of a path resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Whether a template matched.
    pub matched: bool,
    /// The matched template, or empty.
    pub template: String,
    /// The matched operation's id, if it declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Placeholder values taken from the request.
    pub path_params: IndexMap<String, String>,
    /// Whether the matched operation is deprecated.
    pub deprecated: bool,
    /// Tags of the matched operation.
    pub tags: Vec<String>,
    /// Errors from the attempt.
    pub errors: Vec<ValidationError>,
}

impl From<PathMatch<'_>> for Resolution {
    fn from(found: PathMatch<'_>) -> Self {
        Self {
            matched: found.is_match(),
            template: found.template.to_string(),
            operation_id: found.operation_id().map(str::to_string),
            deprecated: found.operation.is_some_and(|op| op.deprecated),
            tags: found.operation.map(|op| op.tags.clone()).unwrap_or_default(),
            path_params: found.path_params,
            errors: found.errors,
        }
    }
}

/// Resolves requests and validates payloads against a swappable contract.
///
/// Readers take a cheap `Arc` snapshot of the current resolver, so a
/// [`reload`](Self::reload) never blocks or disturbs lookups already in
/// flight.
#[derive(Debug)]
pub struct Theseus {
    resolver: RwLock<Arc<PathResolver>>,
    resolver_config: ResolverConfig,
    validator: SchemaValidator,
}

impl Theseus {
    /// Creates a coordinator for `contract`.
    pub fn new(contract: Contract, config: &TheseusConfig) -> Self {
        let resolver = PathResolver::new(Arc::new(contract), config.resolver.clone());
        Self {
            resolver: RwLock::new(Arc::new(resolver)),
            resolver_config: config.resolver.clone(),
            validator: SchemaValidator::new(config.schema.clone()),
        }
    }

    /// Loads the contract at `path` and creates a coordinator for it.
    ///
    /// # Errors
    ///
    /// Returns a `ContractError` if the contract cannot be loaded.
    pub fn from_file(path: impl AsRef<Path>, config: &TheseusConfig) -> ContractResult<Self> {
        Ok(Self::new(ContractLoader::from_file(path)?, config))
    }

    /// A snapshot of the current resolver.
    ///
    /// Use this to obtain a borrowed [`PathMatch`] with access to the full
    /// path item and operation.
    pub fn resolver(&self) -> Arc<PathResolver> {
        Arc::clone(&*self.resolver.read())
    }

    /// The current contract.
    pub fn contract(&self) -> Arc<Contract> {
        Arc::clone(self.resolver.read().contract())
    }

    /// Resolves `request_path` for `method`.
    pub fn resolve(&self, method: &Method, request_path: &str) -> Resolution {
        self.resolver().find_path(method, request_path).into()
    }

    /// Resolves the request and validates `payload` against the matched
    /// operation's JSON request body schema.
    ///
    /// An operation without a request body schema accepts any payload. When
    /// the path does not resolve, the resolution errors are returned.
    pub fn validate_request_body(
        &self,
        method: &Method,
        request_path: &str,
        payload: &[u8],
    ) -> (bool, Vec<ValidationError>) {
        let resolver = self.resolver();
        let found = resolver.find_path(method, request_path);

        let Some(operation) = found.operation else {
            return (false, found.errors);
        };

        match &operation.request_body {
            Some(schema) => self.validator.validate_schema(schema, payload),
            None => (true, Vec::new()),
        }
    }

    /// Replaces the contract.
    pub fn reload(&self, contract: Contract) {
        let resolver = PathResolver::new(Arc::new(contract), self.resolver_config.clone());
        info!(
            title = resolver.contract().title(),
            version = resolver.contract().version(),
            templates = resolver.contract().paths().len(),
            "contract reloaded"
        );
        *self.resolver.write() = Arc::new(resolver);
    }

    /// Reloads the contract from `path`. The current contract stays in place
    /// if loading fails.
    ///
    /// # Errors
    ///
    /// Returns a `ContractError` if the contract cannot be loaded.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> ContractResult<()> {
        let contract = ContractLoader::from_file(path)?;
        self.reload(contract);
        Ok(())
    }
}
