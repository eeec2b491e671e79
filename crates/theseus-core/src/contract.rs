//! Contract model.
//!
//! A [`Contract`] is an insertion-ordered map from path templates to
//! [`PathItem`]s. Declaration order is preserved so that first-match path
//! resolution is reproducible. Contracts are built once (by hand through
//! [`ContractBuilder`] or by [`ContractLoader`](crate::ContractLoader)) and
//! treated as read-only afterwards.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::locate::SpecLocation;

/// HTTP methods that can carry an operation, in the order they are visited.
pub const SUPPORTED_METHODS: [Method; 8] = [
    Method::GET,
    Method::PUT,
    Method::POST,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
    Method::PATCH,
    Method::TRACE,
];

/// Primitive JSON Schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

impl SchemaType {
    /// Parses a schema type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Returns the schema type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Returns true for `number` and `integer`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// A templated path segment.
    Path,
    /// The query string.
    Query,
    /// A request header.
    Header,
    /// A cookie.
    Cookie,
}

impl ParameterLocation {
    /// Parses the `in` value of a parameter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// A schema with its inline-rendered definition and declared types.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    /// Declared types (`type` as a string or an array of strings).
    pub types: Vec<SchemaType>,
    /// Position of the `type` key in the contract document.
    pub location: SpecLocation,
    /// The rendered schema, with local references inlined.
    pub value: Value,
}

impl SchemaDefinition {
    /// Creates a definition from a rendered schema value.
    pub fn from_value(value: Value) -> Self {
        let types = match value.get("type") {
            Some(Value::String(name)) => SchemaType::parse(name).into_iter().collect(),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(SchemaType::parse)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            types,
            location: SpecLocation::UNKNOWN,
            value,
        }
    }

    /// Creates a definition declaring a single type.
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self::from_value(serde_json::json!({ "type": schema_type.as_str() }))
    }

    /// Sets the location of the `type` key.
    pub fn at(mut self, location: SpecLocation) -> Self {
        self.location = location;
        self
    }
}

/// A parameter declared on a path item or an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter lives.
    pub location: ParameterLocation,
    /// Whether the parameter is required.
    pub required: bool,
    /// The parameter schema, if declared.
    pub schema: Option<SchemaDefinition>,
}

impl Parameter {
    /// Creates a parameter without a schema.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            required: location == ParameterLocation::Path,
            location,
            schema: None,
        }
    }

    /// Creates a path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path)
    }

    /// Creates a query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query)
    }

    /// Declares a single schema type.
    pub fn with_type(self, schema_type: SchemaType) -> Self {
        self.with_schema(SchemaDefinition::of_type(schema_type))
    }

    /// Sets the schema.
    pub fn with_schema(mut self, schema: SchemaDefinition) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Returns the declared schema types (empty when no schema is declared).
    pub fn types(&self) -> &[SchemaType] {
        match &self.schema {
            Some(schema) => &schema.types,
            None => &[],
        }
    }

    /// Returns true if this is a path parameter called `name`.
    pub fn is_path_named(&self, name: &str) -> bool {
        self.location == ParameterLocation::Path && self.name == name
    }
}

/// An operation bound to one method of a path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// The operation ID, if declared.
    pub operation_id: Option<String>,
    /// Operation-level parameters.
    pub parameters: Vec<Parameter>,
    /// JSON request body schema, if declared.
    pub request_body: Option<SchemaDefinition>,
    /// Whether the operation is deprecated.
    pub deprecated: bool,
    /// Tags.
    pub tags: Vec<String>,
}

impl Operation {
    /// Creates an empty operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation ID.
    pub fn with_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Adds an operation-level parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the JSON request body schema.
    pub fn with_request_body(mut self, schema: SchemaDefinition) -> Self {
        self.request_body = Some(schema);
        self
    }
}

/// Everything declared under one path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    /// Parameters shared by every operation under this template.
    pub parameters: Vec<Parameter>,
    get: Option<Operation>,
    put: Option<Operation>,
    post: Option<Operation>,
    delete: Option<Operation>,
    options: Option<Operation>,
    head: Option<Operation>,
    patch: Option<Operation>,
    trace: Option<Operation>,
}

impl PathItem {
    /// Creates an empty path item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shared parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Binds an operation to a method. Unsupported methods are ignored.
    pub fn with_operation(mut self, method: &Method, operation: Operation) -> Self {
        if let Some(slot) = self.slot_mut(method) {
            *slot = Some(operation);
        }
        self
    }

    /// Returns the operation bound to `method`.
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::OPTIONS => self.options.as_ref(),
            Method::HEAD => self.head.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            _ => None,
        }
    }

    /// Iterates over bound operations in [`SUPPORTED_METHODS`] order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> + '_ {
        SUPPORTED_METHODS
            .into_iter()
            .filter_map(move |method| self.operation(&method).map(|op| (method, op)))
    }

    /// Finds the path parameter called `name` visible to `operation`.
    ///
    /// Operation-level parameters shadow shared ones of the same name.
    pub fn path_parameter<'a>(
        &'a self,
        operation: &'a Operation,
        name: &str,
    ) -> Option<&'a Parameter> {
        operation
            .parameters
            .iter()
            .chain(&self.parameters)
            .find(|p| p.is_path_named(name))
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }
}

/// An API contract: path templates in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    title: String,
    version: String,
    paths: IndexMap<String, PathItem>,
}

impl Contract {
    /// Creates a new contract builder.
    pub fn builder(title: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(title)
    }

    /// Returns the contract title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the contract version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the path templates and their items in declaration order.
    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    /// Looks up a path item by its template.
    pub fn path_item(&self, template: &str) -> Option<&PathItem> {
        self.paths.get(template)
    }

    /// Counts operations across all templates.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations().count()).sum()
    }

    /// Finds an operation by its ID.
    pub fn find_operation(&self, operation_id: &str) -> Option<(&str, Method, &Operation)> {
        self.paths.iter().find_map(|(template, item)| {
            item.operations()
                .find(|(_, op)| op.operation_id.as_deref() == Some(operation_id))
                .map(|(method, op)| (template.as_str(), method, op))
        })
    }
}

/// Builder for [`Contract`].
#[derive(Debug, Default)]
pub struct ContractBuilder {
    title: String,
    version: String,
    paths: IndexMap<String, PathItem>,
}

impl ContractBuilder {
    /// Creates a builder for a contract with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the contract version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Appends a path template. Re-declaring a template replaces its item but
    /// keeps its original position.
    pub fn path(mut self, template: impl Into<String>, item: PathItem) -> Self {
        self.paths.insert(template.into(), item);
        self
    }

    /// Builds the contract.
    pub fn build(self) -> Contract {
        Contract {
            title: self.title,
            version: self.version,
            paths: self.paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pets_item() -> PathItem {
        PathItem::new()
            .parameter(Parameter::path("petId").with_type(SchemaType::Integer))
            .with_operation(&Method::GET, Operation::new().with_id("getPet"))
            .with_operation(
                &Method::DELETE,
                Operation::new()
                    .with_id("deletePet")
                    .parameter(Parameter::path("petId").with_type(SchemaType::String)),
            )
    }

    #[test]
    fn test_operation_lookup_by_method() {
        let item = pets_item();
        assert_eq!(
            item.operation(&Method::GET).and_then(|op| op.operation_id.as_deref()),
            Some("getPet")
        );
        assert!(item.operation(&Method::POST).is_none());
        assert!(item.operation(&Method::CONNECT).is_none());
    }

    #[test]
    fn test_unsupported_method_is_ignored() {
        let item = PathItem::new().with_operation(&Method::CONNECT, Operation::new());
        assert_eq!(item.operations().count(), 0);
    }

    #[test]
    fn test_operations_follow_method_order() {
        let methods: Vec<Method> = pets_item().operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![Method::GET, Method::DELETE]);
    }

    #[test]
    fn test_operation_parameters_shadow_shared_ones() {
        let item = pets_item();
        let get = item.operation(&Method::GET).unwrap();
        let delete = item.operation(&Method::DELETE).unwrap();

        assert_eq!(
            item.path_parameter(get, "petId").unwrap().types(),
            &[SchemaType::Integer]
        );
        assert_eq!(
            item.path_parameter(delete, "petId").unwrap().types(),
            &[SchemaType::String]
        );
        assert!(item.path_parameter(get, "ownerId").is_none());
    }

    #[test]
    fn test_query_parameters_are_not_path_parameters() {
        let item = PathItem::new()
            .parameter(Parameter::query("petId").with_type(SchemaType::Integer))
            .with_operation(&Method::GET, Operation::new());
        let get = item.operation(&Method::GET).unwrap();
        assert!(item.path_parameter(get, "petId").is_none());
    }

    #[test]
    fn test_schema_definition_types() {
        let single = SchemaDefinition::from_value(json!({ "type": "integer" }));
        assert_eq!(single.types, vec![SchemaType::Integer]);

        let multi = SchemaDefinition::from_value(json!({ "type": ["string", "null", "bogus"] }));
        assert_eq!(multi.types, vec![SchemaType::String, SchemaType::Null]);

        let none = SchemaDefinition::from_value(json!({ "enum": [1, 2] }));
        assert!(none.types.is_empty());
        assert!(!none.location.is_known());
    }

    #[test]
    fn test_contract_preserves_declaration_order() {
        let contract = Contract::builder("pets")
            .version("1.0.0")
            .path("/pets/{petId}", pets_item())
            .path("/pets/mine", PathItem::new())
            .path("/owners", PathItem::new())
            .build();

        let templates: Vec<&str> = contract.paths().keys().map(String::as_str).collect();
        assert_eq!(templates, vec!["/pets/{petId}", "/pets/mine", "/owners"]);
        assert_eq!(contract.title(), "pets");
        assert_eq!(contract.version(), "1.0.0");
        assert_eq!(contract.operation_count(), 2);
    }

    #[test]
    fn test_find_operation() {
        let contract = Contract::builder("pets")
            .path("/pets/{petId}", pets_item())
            .build();

        let (template, method, _) = contract.find_operation("deletePet").unwrap();
        assert_eq!(template, "/pets/{petId}");
        assert_eq!(method, Method::DELETE);
        assert!(contract.find_operation("nope").is_none());
    }
}
