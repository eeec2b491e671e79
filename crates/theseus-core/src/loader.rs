//! Contract loading from OpenAPI 3 documents.
//!
//! The loader reads the parts of an OpenAPI document that path resolution and
//! body validation need: `info`, `paths` (in declaration order), and the
//! `components.parameters` / `components.schemas` that local `$ref`s point at.
//! Schemas are rendered inline so they stand on their own. A reference cycle
//! is hoisted into the rendered schema's `$defs` and referenced from there.
//!
//! Every schema records where its `type` key sits in the source text so that
//! errors raised against it can point back into the document. The source is
//! indexed once per document.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::contract::{
    Contract, Operation, Parameter, ParameterLocation, PathItem, SchemaDefinition,
    SUPPORTED_METHODS,
};
use crate::error::{ContractError, ContractResult};
use crate::locate::{split_pointer, SourceIndex, SpecLocation};

const MAX_REF_DEPTH: usize = 32;

const JSON_BODY_SCHEMA: [&str; 3] = ["content", "application/json", "schema"];

/// Source document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text.
    Json,
    /// YAML text.
    Yaml,
}

impl DocumentFormat {
    /// Determines the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Guesses the format from content: JSON documents open with `{` or `[`.
    pub fn detect(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{' | '[') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Loads contracts from files and strings.
pub struct ContractLoader;

impl ContractLoader {
    /// Loads a contract from a file.
    ///
    /// The format comes from the extension (`.json`, `.yaml`, `.yml`), or is
    /// detected from the content for anything else.
    pub fn from_file(path: impl AsRef<Path>) -> ContractResult<Contract> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading contract from file");

        let content = fs::read_to_string(path).map_err(|e| ContractError::read(path, e))?;
        let format = DocumentFormat::from_path(path)
            .unwrap_or_else(|| DocumentFormat::detect(&content));

        Self::from_source(&content, format)
    }

    /// Loads a contract from JSON text.
    pub fn from_json(content: &str) -> ContractResult<Contract> {
        Self::from_source(content, DocumentFormat::Json)
    }

    /// Loads a contract from YAML text.
    pub fn from_yaml(content: &str) -> ContractResult<Contract> {
        Self::from_source(content, DocumentFormat::Yaml)
    }

    /// Loads a contract from text in the given format.
    pub fn from_source(content: &str, format: DocumentFormat) -> ContractResult<Contract> {
        let root: Value = match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        };

        let contract = Document {
            root: &root,
            index: SourceIndex::new(content),
        }
        .contract()?;

        debug!(
            title = contract.title(),
            version = contract.version(),
            paths = contract.paths().len(),
            operations = contract.operation_count(),
            "contract loaded successfully"
        );

        Ok(contract)
    }
}

struct Document<'a> {
    root: &'a Value,
    index: SourceIndex,
}

impl<'a> Document<'a> {
    fn contract(&self) -> ContractResult<Contract> {
        let info = self.root.get("info");
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut builder = Contract::builder(title).version(version);
        if let Some(paths) = self.root.get("paths").and_then(Value::as_object) {
            for (template, item) in paths {
                builder = builder.path(template.clone(), self.path_item(template, item)?);
            }
        }
        Ok(builder.build())
    }

    fn path_item(&self, template: &str, value: &'a Value) -> ContractResult<PathItem> {
        let (value, base) = self.follow(value, vec!["paths".to_string(), template.to_string()])?;

        let mut item = PathItem::new();
        for parameter in self.parameters(template, value, &base)? {
            item = item.parameter(parameter);
        }

        for method in SUPPORTED_METHODS {
            let key = method.as_str().to_ascii_lowercase();
            if let Some(op) = value.get(&key) {
                let operation = self.operation(template, op, child(&base, &key))?;
                item = item.with_operation(&method, operation);
            }
        }

        Ok(item)
    }

    fn parameters(
        &self,
        template: &str,
        owner: &'a Value,
        base: &[String],
    ) -> ContractResult<Vec<Parameter>> {
        let Some(list) = owner.get("parameters").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        let base = child(base, "parameters");
        list.iter()
            .enumerate()
            .map(|(i, p)| self.parameter(template, p, child(&base, &i.to_string())))
            .collect()
    }

    fn parameter(
        &self,
        template: &str,
        value: &'a Value,
        pointer: Vec<String>,
    ) -> ContractResult<Parameter> {
        let (value, pointer) = self.follow(value, pointer)?;

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ContractError::invalid_parameter(template, "missing 'name'"))?;
        let location = value.get("in").and_then(Value::as_str).ok_or_else(|| {
            ContractError::invalid_parameter(template, format!("parameter '{name}' is missing 'in'"))
        })?;
        let location = ParameterLocation::parse(location).ok_or_else(|| {
            ContractError::invalid_parameter(
                template,
                format!("parameter '{name}' has unknown location '{location}'"),
            )
        })?;

        let mut parameter = Parameter::new(name, location);
        if let Some(required) = value.get("required").and_then(Value::as_bool) {
            parameter.required = required;
        }
        if let Some(schema) = value.get("schema") {
            parameter.schema = Some(self.schema(schema, child(&pointer, "schema"))?);
        }
        Ok(parameter)
    }

    fn operation(
        &self,
        template: &str,
        value: &'a Value,
        pointer: Vec<String>,
    ) -> ContractResult<Operation> {
        let mut operation = Operation::new();
        operation.operation_id = value
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_string);
        operation.deprecated = value
            .get("deprecated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        operation.tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        operation.parameters = self.parameters(template, value, &pointer)?;

        if let Some(body) = value.get("requestBody") {
            let (body, mut body_pointer) = self.follow(body, child(&pointer, "requestBody"))?;
            if let Some(schema) = body.pointer("/content/application~1json/schema") {
                body_pointer.extend(JSON_BODY_SCHEMA.map(String::from));
                operation.request_body = Some(self.schema(schema, body_pointer)?);
            }
        }

        Ok(operation)
    }

    fn schema(&self, value: &'a Value, pointer: Vec<String>) -> ContractResult<SchemaDefinition> {
        let (_, mut pointer) = self.follow(value, pointer)?;
        let rendered = Inliner::new(self.root).render(value)?;

        pointer.push("type".to_string());
        let location = self.index.get(&pointer).unwrap_or(SpecLocation::UNKNOWN);

        Ok(SchemaDefinition::from_value(rendered).at(location))
    }

    // Follows a chain of `$ref`s, returning the target and its pointer.
    fn follow(
        &self,
        mut value: &'a Value,
        mut pointer: Vec<String>,
    ) -> ContractResult<(&'a Value, Vec<String>)> {
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
                return Ok((value, pointer));
            };
            value = resolve(self.root, reference)?;
            pointer = split_pointer(reference);
        }
        Err(ContractError::unresolved(format!(
            "{} (reference chain deeper than {MAX_REF_DEPTH})",
            pointer.join("/")
        )))
    }
}

fn resolve<'a>(root: &'a Value, reference: &str) -> ContractResult<&'a Value> {
    reference
        .strip_prefix('#')
        .and_then(|p| root.pointer(p))
        .ok_or_else(|| ContractError::unresolved(reference))
}

/// Renders a schema with its local references substituted.
///
/// A reference met again while its own target is being rendered would
/// expand forever. Its target is rendered once into `$defs` instead and the
/// inner reference is rewritten to `#/$defs/<name>`.
struct Inliner<'a> {
    root: &'a Value,
    hoisted: Vec<(&'a str, String)>,
}

impl<'a> Inliner<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            hoisted: Vec::new(),
        }
    }

    fn render(mut self, value: &'a Value) -> ContractResult<Value> {
        let rendered = self.inline(value, &mut Vec::new())?;
        if self.hoisted.is_empty() {
            return Ok(rendered);
        }

        let mut defs = Map::new();
        let mut next = 0;
        while let Some((reference, name)) = self.hoisted.get(next).cloned() {
            let target = resolve(self.root, reference)?;
            defs.insert(name, self.inline(target, &mut vec![reference])?);
            next += 1;
        }

        Ok(match rendered {
            Value::Object(mut map) => {
                map.insert("$defs".to_string(), Value::Object(defs));
                Value::Object(map)
            }
            other => json!({ "allOf": [other], "$defs": defs }),
        })
    }

    fn inline(&mut self, value: &'a Value, seen: &mut Vec<&'a str>) -> ContractResult<Value> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if seen.contains(&reference) {
                        let name = self.hoist(reference);
                        return Ok(json!({ "$ref": format!("#/$defs/{}", escape(&name)) }));
                    }
                    let target = resolve(self.root, reference)?;
                    seen.push(reference);
                    let rendered = self.inline(target, seen);
                    seen.pop();
                    return rendered;
                }
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.inline(v, seen)?)))
                    .collect::<ContractResult<Map<String, Value>>>()
                    .map(Value::Object)
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.inline(v, seen))
                .collect::<ContractResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    // Names a hoisted target after the last token of its reference, with a
    // numeric suffix when two references share that token.
    fn hoist(&mut self, reference: &'a str) -> String {
        if let Some((_, name)) = self.hoisted.iter().find(|(r, _)| *r == reference) {
            return name.clone();
        }
        let base = split_pointer(reference).pop().unwrap_or_else(|| "root".to_string());
        let mut name = base.clone();
        let mut suffix = 1;
        while self.hoisted.iter().any(|(_, taken)| *taken == name) {
            suffix += 1;
            name = format!("{base}{suffix}");
        }
        self.hoisted.push((reference, name.clone()));
        name
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn child(base: &[String], token: &str) -> Vec<String> {
    let mut pointer = base.to_vec();
    pointer.push(token.to_string());
    pointer
}
