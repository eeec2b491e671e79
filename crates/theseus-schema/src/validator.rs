//! Payload validation against contract schemas.

use jsonschema::Validator;
use serde_json::Value;
use theseus_core::error::{HOW_TO_FIX_INVALID_PAYLOAD, HOW_TO_FIX_INVALID_SCHEMA};
use theseus_core::{
    split_pointer, SchemaDefinition, SchemaValidationFailure, SourceIndex, SpecLocation,
    ValidationError, ValidationType,
};
use tracing::{debug, warn};

use crate::config::SchemaConfig;

/// Engine messages starting with this carry no information of their own.
const NOISE_PREFIX: &str = "doesn't validate with";

/// Validates payloads against schemas and reports failures as
/// [`ValidationError`]s.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: SchemaConfig,
}

impl SchemaValidator {
    /// Creates a validator with the given configuration.
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Validates a raw JSON payload.
    ///
    /// Returns `(true, [])` when the payload conforms. Otherwise the list
    /// holds exactly one `schema` error: the validation failure with its
    /// nested engine failures, or a `compile` / `payload` error when the
    /// schema or payload could not be used at all.
    pub fn validate_schema(
        &self,
        schema: &SchemaDefinition,
        payload: &[u8],
    ) -> (bool, Vec<ValidationError>) {
        let validator = match self.compile(schema) {
            Ok(validator) => validator,
            Err(error) => return (false, vec![error]),
        };

        let instance: Value = match serde_json::from_slice(payload) {
            Ok(instance) => instance,
            Err(err) => {
                warn!(error = %err, "payload is not valid JSON");
                let error = ValidationError::new(
                    ValidationType::Schema,
                    "payload cannot be decoded",
                    format!("The payload is not valid JSON: {err}"),
                )
                .with_sub_type("payload")
                .with_how_to_fix(HOW_TO_FIX_INVALID_PAYLOAD)
                .at(schema.location);
                return (false, vec![error]);
            }
        };

        self.check(schema, &validator, &instance)
    }

    /// Validates an already decoded value.
    pub fn validate_value(
        &self,
        schema: &SchemaDefinition,
        instance: &Value,
    ) -> (bool, Vec<ValidationError>) {
        match self.compile(schema) {
            Ok(validator) => self.check(schema, &validator, instance),
            Err(error) => (false, vec![error]),
        }
    }

    fn compile(&self, schema: &SchemaDefinition) -> Result<Validator, ValidationError> {
        jsonschema::validator_for(&schema.value).map_err(|err| {
            warn!(error = %err, "schema cannot be compiled");
            let mut error = ValidationError::new(
                ValidationType::Schema,
                "schema cannot be compiled",
                format!("The schema is not a valid JSON Schema: {err}"),
            )
            .with_sub_type("compile")
            .at(schema.location);
            if self.config.attach_rendered_schema {
                error = error.with_context(render(&schema.value));
            }
            error
        })
    }

    fn check(
        &self,
        schema: &SchemaDefinition,
        validator: &Validator,
        instance: &Value,
    ) -> (bool, Vec<ValidationError>) {
        let mut reported = validator.iter_errors(instance).peekable();
        if reported.peek().is_none() {
            return (true, Vec::new());
        }

        let rendered = (self.config.locate_failures || self.config.attach_rendered_schema)
            .then(|| render(&schema.value));
        let index = rendered
            .as_deref()
            .filter(|_| self.config.locate_failures)
            .map(SourceIndex::new);

        let failures: Vec<SchemaValidationFailure> = reported
            .filter_map(|err| {
                let location = err.schema_path.to_string();
                let reason = err.to_string();
                if is_noise(&location, &reason) {
                    debug!(%location, %reason, "suppressed schema failure");
                    return None;
                }

                let spec_location = index
                    .as_ref()
                    .and_then(|index| index.get(&split_pointer(&location)))
                    .unwrap_or_default();

                Some(SchemaValidationFailure {
                    reason,
                    location,
                    spec_location,
                })
            })
            .collect();

        debug!(failures = failures.len(), "payload does not pass schema");

        let mut error = ValidationError::new(
            ValidationType::Schema,
            "schema does not pass validation",
            "Schema failed to validated against the contract requirements",
        )
        .with_how_to_fix(HOW_TO_FIX_INVALID_SCHEMA)
        .at(schema.location)
        .with_failures(failures);

        if let Some(rendered) = rendered.filter(|_| self.config.attach_rendered_schema) {
            error = error.with_context(rendered);
        }

        (false, vec![error])
    }
}

/// Validates `payload` against `schema` with the default configuration.
pub fn validate_schema(schema: &SchemaDefinition, payload: &[u8]) -> (bool, Vec<ValidationError>) {
    SchemaValidator::default().validate_schema(schema, payload)
}

fn is_noise(location: &str, reason: &str) -> bool {
    location.is_empty() || reason.starts_with(NOISE_PREFIX)
}

/// Renders a schema as YAML text, falling back to pretty JSON.
fn render(value: &Value) -> String {
    serde_yaml::to_string(value)
        .or_else(|_| serde_json::to_string_pretty(value))
        .unwrap_or_default()
}

/// Location of the keyword `pointer` in the YAML rendering of `value`.
pub fn locate_keyword(value: &Value, pointer: &str) -> SpecLocation {
    SourceIndex::new(&render(value))
        .get(&split_pointer(pointer))
        .unwrap_or_default()
}
