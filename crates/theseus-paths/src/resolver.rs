//! Request path resolution.
//!
//! This module provides the [`PathResolver`] which maps an HTTP method and a
//! request path onto a contract's path templates, and the [`find_path`]
//! shorthand for one-off lookups in declaration order.

use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use theseus_core::error::{HOW_TO_FIX_PARAM_INVALID_NUMBER, HOW_TO_FIX_PARAM_INVALID_STRING};
use theseus_core::{
    Contract, Operation, Parameter, PathItem, SchemaType, ValidationError, ValidationType,
    SUPPORTED_METHODS,
};
use tracing::debug;

use crate::config::{MatchOrder, ResolverConfig};
use crate::template::{canonical_join, specificity, split_segments, PathTemplate, Segment};

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch<'c> {
    /// The matched path item.
    pub path_item: Option<&'c PathItem>,
    /// The operation bound to the requested method on the matched item.
    pub operation: Option<&'c Operation>,
    /// The template that matched, or empty when nothing did.
    pub template: &'c str,
    /// Placeholder values taken from the request, by parameter name.
    pub path_params: IndexMap<String, String>,
    /// Errors from the attempt. Empty on a match.
    pub errors: Vec<ValidationError>,
}

impl<'c> PathMatch<'c> {
    fn found(
        template: &'c str,
        path_item: &'c PathItem,
        operation: &'c Operation,
        path_params: IndexMap<String, String>,
    ) -> Self {
        Self {
            path_item: Some(path_item),
            operation: Some(operation),
            template,
            path_params,
            errors: Vec::new(),
        }
    }

    fn not_found(errors: Vec<ValidationError>) -> Self {
        Self {
            path_item: None,
            operation: None,
            template: "",
            path_params: IndexMap::new(),
            errors,
        }
    }

    /// Returns true if a template matched.
    pub fn is_match(&self) -> bool {
        self.path_item.is_some()
    }

    /// The matched operation's id, if it declares one.
    pub fn operation_id(&self) -> Option<&'c str> {
        self.operation.and_then(|op| op.operation_id.as_deref())
    }

    /// Splits the match into `(path item, errors, template)`.
    pub fn into_parts(self) -> (Option<&'c PathItem>, Vec<ValidationError>, &'c str) {
        (self.path_item, self.errors, self.template)
    }
}

/// Resolves request paths against a contract.
///
/// The resolver fixes the template iteration order once, at construction.
/// It holds the contract by `Arc` so it can be shared across threads and
/// swapped out wholesale when the contract changes.
#[derive(Debug, Clone)]
pub struct PathResolver {
    contract: Arc<Contract>,
    config: ResolverConfig,
    /// Indices into `contract.paths()` in match order.
    order: Vec<usize>,
}

impl PathResolver {
    /// Creates a resolver for the given contract.
    pub fn new(contract: Arc<Contract>, config: ResolverConfig) -> Self {
        let paths = contract.paths();
        let mut order: Vec<usize> = (0..paths.len()).collect();

        if config.match_order == MatchOrder::Specificity {
            // Stable, so equally specific templates keep declaration order.
            order.sort_by(|&a, &b| {
                let a = paths.get_index(a).map_or("", |(t, _)| t.as_str());
                let b = paths.get_index(b).map_or("", |(t, _)| t.as_str());
                specificity(a, b)
            });
        }

        debug!(
            templates = order.len(),
            operations = contract.operation_count(),
            match_order = ?config.match_order,
            "path resolver initialized"
        );

        Self {
            contract,
            config,
            order,
        }
    }

    /// Creates a resolver with the default configuration.
    pub fn with_defaults(contract: Arc<Contract>) -> Self {
        Self::new(contract, ResolverConfig::default())
    }

    /// The contract being resolved against.
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `request_path` for `method`.
    pub fn find_path(&self, method: &Method, request_path: &str) -> PathMatch<'_> {
        resolve(
            self.candidates(),
            method,
            request_path,
            self.config.report_parameter_types,
        )
    }

    /// Returns true if `request_path` resolves for `method`.
    pub fn has_path(&self, method: &Method, request_path: &str) -> bool {
        self.find_path(method, request_path).is_match()
    }

    /// Templates with an operation for `method`, in match order.
    pub fn templates_for_method(&self, method: &Method) -> Vec<&str> {
        self.candidates()
            .filter(|(_, item)| item.operation(method).is_some())
            .map(|(template, _)| template)
            .collect()
    }

    /// Methods bound by at least one template.
    pub fn methods(&self) -> Vec<Method> {
        SUPPORTED_METHODS
            .into_iter()
            .filter(|method| {
                self.contract
                    .paths()
                    .values()
                    .any(|item| item.operation(method).is_some())
            })
            .collect()
    }

    fn candidates(&self) -> impl Iterator<Item = (&str, &PathItem)> + '_ {
        let paths = self.contract.paths();
        self.order
            .iter()
            .filter_map(move |&index| paths.get_index(index))
            .map(|(template, item)| (template.as_str(), item))
    }
}

/// Resolves `request_path` for `method` in the contract's declaration order.
///
/// Parameter type mismatches are folded into the not-found result.
pub fn find_path<'c>(method: &Method, request_path: &str, contract: &'c Contract) -> PathMatch<'c> {
    let candidates = contract
        .paths()
        .iter()
        .map(|(template, item)| (template.as_str(), item));
    resolve(candidates, method, request_path, false)
}

fn resolve<'c>(
    candidates: impl Iterator<Item = (&'c str, &'c PathItem)>,
    method: &Method,
    request_path: &str,
    report_parameter_types: bool,
) -> PathMatch<'c> {
    let requested = split_segments(request_path);
    let mut type_errors = Vec::new();

    for (template, item) in candidates {
        let Some(operation) = item.operation(method) else {
            continue;
        };

        if request_path == template {
            debug!(%method, path = request_path, template, "path matched literally");
            return PathMatch::found(template, item, operation, IndexMap::new());
        }

        match compare(&PathTemplate::parse(template), &requested, item, operation) {
            Comparison::Match(path_params) => {
                debug!(%method, path = request_path, template, "path matched");
                return PathMatch::found(template, item, operation, path_params);
            }
            Comparison::TypeMismatch(mismatches) => {
                debug!(
                    %method,
                    path = request_path,
                    template,
                    mismatches = mismatches.len(),
                    "path parameters do not fit template"
                );
                if report_parameter_types {
                    type_errors.extend(mismatches.iter().map(|m| m.to_error(request_path)));
                }
            }
            Comparison::NoMatch => {}
        }
    }

    debug!(%method, path = request_path, "no path matched");
    type_errors.push(ValidationError::path_missing(request_path));
    PathMatch::not_found(type_errors)
}

enum Comparison<'c> {
    Match(IndexMap<String, String>),
    TypeMismatch(Vec<TypeMismatch<'c>>),
    NoMatch,
}

/// A path parameter value that a declared type rejects.
struct TypeMismatch<'c> {
    parameter: &'c Parameter,
    expected: SchemaType,
    value: String,
}

impl TypeMismatch<'_> {
    fn to_error(&self, request_path: &str) -> ValidationError {
        let name = &self.parameter.name;
        let value = &self.value;
        let location = self
            .parameter
            .schema
            .as_ref()
            .map(|schema| schema.location)
            .unwrap_or_default();

        let error = if self.expected.is_numeric() {
            ValidationError::new(
                ValidationType::Path,
                format!("Match for path '{request_path}', but the parameter '{name}' is not a number"),
                format!(
                    "The parameter '{name}' is defined as {} '{}', but the value '{value}' is not a number",
                    article(self.expected),
                    self.expected.as_str()
                ),
            )
            .with_sub_type("number")
            .with_how_to_fix(HOW_TO_FIX_PARAM_INVALID_NUMBER)
        } else {
            ValidationError::new(
                ValidationType::Path,
                format!("Match for path '{request_path}', but the parameter '{name}' is a number"),
                format!(
                    "The parameter '{name}' is defined as a 'string', but the value '{value}' is a number"
                ),
            )
            .with_sub_type("string")
            .with_how_to_fix(HOW_TO_FIX_PARAM_INVALID_STRING)
        };

        error.at(location)
    }
}

fn article(schema_type: SchemaType) -> &'static str {
    match schema_type {
        SchemaType::Integer | SchemaType::Array | SchemaType::Object => "an",
        _ => "a",
    }
}

fn compare<'c>(
    template: &PathTemplate<'_>,
    requested: &[&str],
    item: &'c PathItem,
    operation: &'c Operation,
) -> Comparison<'c> {
    if template.len() != requested.len() {
        return Comparison::NoMatch;
    }

    let mut rebuilt = Vec::with_capacity(requested.len());
    let mut path_params = IndexMap::new();
    let mut mismatches = Vec::new();

    for (segment, &value) in template.segments().iter().zip(requested) {
        match *segment {
            Segment::Literal(text) => rebuilt.push(text),
            Segment::Placeholder { name, .. } => {
                if let Some(parameter) = item.path_parameter(operation, name) {
                    if let Some(expected) = rejecting_type(parameter.types(), value) {
                        mismatches.push(TypeMismatch {
                            parameter,
                            expected,
                            value: value.to_string(),
                        });
                    }
                }
                path_params.insert(name.to_string(), value.to_string());
                rebuilt.push(value);
            }
        }
    }

    if canonical_join(rebuilt) != canonical_join(requested.iter().copied()) {
        return Comparison::NoMatch;
    }

    if mismatches.is_empty() {
        Comparison::Match(path_params)
    } else {
        Comparison::TypeMismatch(mismatches)
    }
}

/// The first declared type that rejects `value`, if any.
fn rejecting_type(types: &[SchemaType], value: &str) -> Option<SchemaType> {
    let numeric = is_numeric(value);
    types.iter().copied().find(|schema_type| match schema_type {
        SchemaType::String => numeric,
        SchemaType::Number | SchemaType::Integer => !numeric,
        _ => false,
    })
}

/// Whether `value` reads as a float: decimal or `0x` hexadecimal with a `p`
/// exponent, or a spelled-out infinity or NaN. Digits that overflow `f64`
/// are out of range and do not count.
fn is_numeric(value: &str) -> bool {
    if let Some(magnitude) = hex_float_log2(value) {
        return magnitude < f64::from(f64::MAX_EXP);
    }
    match value.parse::<f64>() {
        Ok(n) => n.is_finite() || !value.bytes().any(|b| b.is_ascii_digit()),
        Err(_) => false,
    }
}

/// Base-2 logarithm of a hexadecimal float such as `0x1.8p3`, or `None` if
/// `value` is not one. Zero mantissas yield negative infinity.
#[allow(clippy::cast_precision_loss)]
fn hex_float_log2(value: &str) -> Option<f64> {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let body = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    let (mantissa, exponent) = body.split_once(['p', 'P'])?;

    let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
    let digits = exponent.strip_prefix('-').unwrap_or(exponent);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let exponent = exponent.parse::<i64>().unwrap_or(if exponent.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    });

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let mut scaled = 0f64;
    for c in whole.chars().chain(fraction.chars()) {
        scaled = scaled * 16.0 + f64::from(c.to_digit(16)?);
    }
    let shift = i64::try_from(fraction.len()).ok()?.saturating_mul(4);

    Some(scaled.log2() + exponent.saturating_sub(shift) as f64)
}

#[cfg(test)]
mod tests {
    use theseus_core::{Parameter, SchemaDefinition, SpecLocation};

    use super::*;

    fn get(id: &str) -> PathItem {
        PathItem::new().with_operation(&Method::GET, Operation::new().with_id(id))
    }

    fn get_with_param(id: &str, name: &str, schema_type: SchemaType) -> PathItem {
        get(id).parameter(Parameter::path(name).with_type(schema_type))
    }

    fn pets(mine_first: bool, pet_id_type: SchemaType) -> Contract {
        let mine = ("/pets/mine", get("listMyPets"));
        let by_id = ("/pets/{petId}", get_with_param("getPet", "petId", pet_id_type));
        let (first, second) = if mine_first { (mine, by_id) } else { (by_id, mine) };
        Contract::builder("Pets")
            .path(first.0, first.1)
            .path(second.0, second.1)
            .build()
    }

    #[test]
    fn test_literal_path_matches_without_errors() {
        let contract = Contract::builder("Pets").path("/pets", get("listPets")).build();
        let found = find_path(&Method::GET, "/pets", &contract);

        assert!(found.is_match());
        assert!(found.errors.is_empty());
        assert_eq!(found.template, "/pets");
        assert_eq!(found.operation_id(), Some("listPets"));
    }

    #[test]
    fn test_literal_match_wins_before_type_check() {
        let contract = Contract::builder("Items")
            .path("/items/{id}", get_with_param("getItem", "id", SchemaType::Integer))
            .build();
        let found = find_path(&Method::GET, "/items/{id}", &contract);
        assert!(found.is_match());
        assert!(found.path_params.is_empty());
    }

    #[test]
    fn test_placeholder_with_conforming_value_matches() {
        let contract = Contract::builder("Items")
            .path("/items/{id}", get_with_param("getItem", "id", SchemaType::Integer))
            .build();

        let found = find_path(&Method::GET, "/items/42", &contract);
        assert!(found.is_match());
        assert_eq!(found.template, "/items/{id}");
        assert_eq!(found.path_params.get("id").map(String::as_str), Some("42"));

        let missed = find_path(&Method::GET, "/items/abc", &contract);
        assert!(!missed.is_match());
        assert_eq!(missed.errors.len(), 1);
        assert!(missed.errors[0].is(ValidationType::Path, "missing"));
    }

    #[test]
    fn test_untyped_placeholder_accepts_anything() {
        let contract = Contract::builder("Files")
            .path("/files/{name}", get("getFile"))
            .build();
        for path in ["/files/readme", "/files/42", "/files/"] {
            assert!(find_path(&Method::GET, path, &contract).is_match(), "{path}");
        }
    }

    #[test]
    fn test_missing_path_reports_single_error() {
        let contract = Contract::builder("Pets").path("/pets", get("listPets")).build();
        let found = find_path(&Method::GET, "/owners/7", &contract);

        assert!(found.operation.is_none());
        assert!(found.path_item.is_none());
        assert_eq!(found.template, "");
        assert_eq!(found.errors.len(), 1);

        let error = &found.errors[0];
        assert_eq!(error.validation_type, ValidationType::Path);
        assert_eq!(error.validation_sub_type.as_deref(), Some("missing"));
        assert_eq!(error.message, "Path '/owners/7' not found");
        assert_eq!(
            error.reason,
            "The request contains a path of '/owners/7' however that path does not exist in the specification"
        );
        assert_eq!(error.spec_location, SpecLocation::UNKNOWN);
    }

    #[test]
    fn test_unbound_method_is_not_found() {
        let contract = Contract::builder("Pets").path("/pets", get("listPets")).build();
        let found = find_path(&Method::DELETE, "/pets", &contract);
        assert!(!found.is_match());

        let custom = Method::from_bytes(b"PURGE").unwrap();
        assert!(!find_path(&custom, "/pets", &contract).is_match());
    }

    #[test]
    fn test_segment_count_must_agree() {
        let contract = Contract::builder("Tree")
            .path("/a/b/c", get("deep"))
            .path("/a", get("shallow"))
            .build();
        assert!(!find_path(&Method::GET, "/a/b", &contract).is_match());
    }

    #[test]
    fn test_trailing_slash_cleans_away() {
        let contract = Contract::builder("Users")
            .path("/users/{id}", get("getUser"))
            .build();
        let found = find_path(&Method::GET, "/users/", &contract);
        assert!(found.is_match());
        assert_eq!(found.path_params.get("id").map(String::as_str), Some(""));
    }

    #[test]
    fn test_literal_declared_first_wins_either_way() {
        let contract = pets(true, SchemaType::Integer);
        let found = find_path(&Method::GET, "/pets/mine", &contract);
        assert_eq!(found.template, "/pets/mine");
        assert_eq!(found.operation_id(), Some("listMyPets"));
    }

    #[test]
    fn test_integer_placeholder_declared_first_rejects_literal_word() {
        let contract = pets(false, SchemaType::Integer);
        let found = find_path(&Method::GET, "/pets/mine", &contract);
        assert_eq!(found.template, "/pets/mine");

        let found = find_path(&Method::GET, "/pets/12", &contract);
        assert_eq!(found.template, "/pets/{petId}");
    }

    #[test]
    fn test_string_placeholder_declared_first_wins() {
        let contract = pets(false, SchemaType::String);
        let found = find_path(&Method::GET, "/pets/mine", &contract);
        assert_eq!(found.template, "/pets/{petId}");
        assert_eq!(found.operation_id(), Some("getPet"));
    }

    #[test]
    fn test_specificity_order_prefers_literal() {
        let resolver = PathResolver::new(
            Arc::new(pets(false, SchemaType::String)),
            ResolverConfig::default().with_match_order(MatchOrder::Specificity),
        );
        let found = resolver.find_path(&Method::GET, "/pets/mine");
        assert_eq!(found.template, "/pets/mine");
        assert_eq!(
            resolver.templates_for_method(&Method::GET),
            vec!["/pets/mine", "/pets/{petId}"]
        );
    }

    #[test]
    fn test_numeric_value_rejected_by_string_parameter() {
        let contract = Contract::builder("Orders")
            .path(
                "/orders/{orderId}",
                PathItem::new().with_operation(
                    &Method::POST,
                    Operation::new()
                        .with_id("createOrder")
                        .parameter(Parameter::path("orderId").with_type(SchemaType::String)),
                ),
            )
            .build();

        let found = find_path(&Method::POST, "/orders/123", &contract);
        assert!(!found.is_match());
        assert_eq!(found.errors.len(), 1);
        assert!(found.errors[0].is(ValidationType::Path, "missing"));

        assert!(find_path(&Method::POST, "/orders/abc", &contract).is_match());
    }

    #[test]
    fn test_operation_parameter_shadows_path_parameter() {
        let item = PathItem::new()
            .parameter(Parameter::path("id").with_type(SchemaType::Integer))
            .with_operation(
                &Method::GET,
                Operation::new().parameter(Parameter::path("id").with_type(SchemaType::String)),
            )
            .with_operation(&Method::DELETE, Operation::new());
        let contract = Contract::builder("Shadow").path("/things/{id}", item).build();

        assert!(find_path(&Method::GET, "/things/abc", &contract).is_match());
        assert!(!find_path(&Method::GET, "/things/7", &contract).is_match());
        assert!(find_path(&Method::DELETE, "/things/7", &contract).is_match());
        assert!(!find_path(&Method::DELETE, "/things/abc", &contract).is_match());
    }

    #[test]
    fn test_any_rejecting_type_fails_the_value() {
        let schema = SchemaDefinition::from_value(serde_json::json!({ "type": ["integer", "string"] }));
        let item = get("getCode").parameter(Parameter::path("code").with_schema(schema));
        let contract = Contract::builder("Codes").path("/codes/{code}", item).build();

        assert!(!find_path(&Method::GET, "/codes/12", &contract).is_match());
        assert!(!find_path(&Method::GET, "/codes/ab", &contract).is_match());
    }

    #[test]
    fn test_numeric_values_follow_float_syntax() {
        for value in ["42", "-3.5", "1e3", ".5", "0x1p4", "0X1.8P-2", "Inf", "-infinity", "NaN"] {
            assert!(is_numeric(value), "{value} should be numeric");
        }
        for value in ["1e400", "-1e400", "0x1p2000", "0x1", "0xp4", "12abc", "", "1_000"] {
            assert!(!is_numeric(value), "{value} should not be numeric");
        }
    }

    #[test]
    fn test_overflowing_value_rejected_by_integer_parameter() {
        let contract = pets(false, SchemaType::Integer);
        assert!(!find_path(&Method::GET, "/pets/1e400", &contract).is_match());
        assert!(find_path(&Method::GET, "/pets/0x1p4", &contract).is_match());
    }

    #[test]
    fn test_reported_parameter_type_errors_precede_missing() {
        let schema = SchemaDefinition::of_type(SchemaType::Integer).at(SpecLocation::new(14, 11));
        let item = get("getItem").parameter(Parameter::path("id").with_schema(schema));
        let contract = Arc::new(Contract::builder("Items").path("/items/{id}", item).build());
        let resolver = PathResolver::new(
            contract,
            ResolverConfig::default().with_parameter_type_errors(true),
        );

        let found = resolver.find_path(&Method::GET, "/items/abc");
        assert!(!found.is_match());
        assert_eq!(found.errors.len(), 2);

        let type_error = &found.errors[0];
        assert!(type_error.is(ValidationType::Path, "number"));
        assert_eq!(
            type_error.message,
            "Match for path '/items/abc', but the parameter 'id' is not a number"
        );
        assert!(type_error.reason.contains("'abc'"));
        assert_eq!(type_error.spec_location, SpecLocation::new(14, 11));
        assert!(type_error.how_to_fix.is_some());

        assert!(found.errors[1].is(ValidationType::Path, "missing"));
    }

    #[test]
    fn test_reported_string_type_error() {
        let item = get("getTag").parameter(Parameter::path("tag").with_type(SchemaType::String));
        let contract = Arc::new(Contract::builder("Tags").path("/tags/{tag}", item).build());
        let resolver = PathResolver::new(contract, ResolverConfig::strict());

        let found = resolver.find_path(&Method::GET, "/tags/3.5");
        assert_eq!(found.errors.len(), 2);
        assert!(found.errors[0].is(ValidationType::Path, "string"));
        assert!(found.errors[0].reason.contains("'3.5'"));
    }

    #[test]
    fn test_type_errors_dropped_when_later_template_matches() {
        let contract = Arc::new(pets(false, SchemaType::Integer));
        let resolver = PathResolver::new(
            contract,
            ResolverConfig::default().with_parameter_type_errors(true),
        );
        let found = resolver.find_path(&Method::GET, "/pets/mine");
        assert!(found.is_match());
        assert!(found.errors.is_empty());
    }

    #[test]
    fn test_multiple_path_params_extracted_in_order() {
        let item = get("getOrder")
            .parameter(Parameter::path("userId").with_type(SchemaType::Integer))
            .parameter(Parameter::path("orderId").with_type(SchemaType::String));
        let contract = Contract::builder("Orders")
            .path("/users/{userId}/orders/{orderId}", item)
            .build();

        let found = find_path(&Method::GET, "/users/42/orders/abc-1", &contract);
        assert!(found.is_match());
        let params: Vec<_> = found.path_params.iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], (&"userId".to_string(), &"42".to_string()));
        assert_eq!(params[1], (&"orderId".to_string(), &"abc-1".to_string()));
    }

    #[test]
    fn test_resolver_helpers() {
        let contract = Contract::builder("Mixed")
            .path("/pets", get("listPets"))
            .path(
                "/pets/{petId}",
                get("getPet").with_operation(&Method::DELETE, Operation::new()),
            )
            .build();
        let resolver = PathResolver::with_defaults(Arc::new(contract));

        assert!(resolver.has_path(&Method::GET, "/pets"));
        assert!(!resolver.has_path(&Method::DELETE, "/pets"));
        assert_eq!(resolver.templates_for_method(&Method::DELETE), vec!["/pets/{petId}"]);
        assert_eq!(resolver.methods(), vec![Method::GET, Method::DELETE]);
        assert_eq!(resolver.config(), &ResolverConfig::default());
    }

    #[test]
    fn test_into_parts() {
        let contract = Contract::builder("Pets").path("/pets", get("listPets")).build();
        let (item, errors, template) = find_path(&Method::GET, "/pets", &contract).into_parts();
        assert!(item.is_some());
        assert!(errors.is_empty());
        assert_eq!(template, "/pets");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let contract = pets(false, SchemaType::Integer);
        let first = find_path(&Method::GET, "/pets/7", &contract);
        let second = find_path(&Method::GET, "/pets/7", &contract);
        assert_eq!(first, second);
    }
}
