//! `theseus validate`

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args};
use serde_json::{json, Value};
use theseus::core::{locate, SchemaDefinition};
use theseus::{SchemaValidator, Theseus, TheseusConfig};
use tracing::debug;

/// Arguments for `theseus validate`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["contract", "schema"])))]
pub struct ValidateArgs {
    /// OpenAPI contract whose request body schema is used.
    #[arg(short, long, requires_all = ["method", "path"])]
    pub contract: Option<PathBuf>,

    /// Standalone JSON Schema (JSON or YAML).
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Request method, with --contract.
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Request path, with --contract.
    #[arg(long)]
    pub path: Option<String>,

    /// Payload file. Reads stdin when omitted.
    #[arg(short, long)]
    pub payload: Option<PathBuf>,
}

/// Prints `{ "valid": .., "errors": [..] }`. Returns whether the payload is
/// valid.
pub fn execute(args: &ValidateArgs, config: &TheseusConfig) -> anyhow::Result<bool> {
    let payload = read_payload(args.payload.as_deref())?;

    let (valid, errors) = match (&args.contract, &args.schema) {
        (Some(contract), _) => {
            let theseus = Theseus::from_file(contract, config)
                .with_context(|| format!("loading contract {}", contract.display()))?;
            let method = args.method.as_deref().context("--method is required")?;
            let path = args.path.as_deref().context("--path is required")?;
            theseus.validate_request_body(&crate::parse_method(method)?, path, &payload)
        }
        (None, Some(schema)) => {
            let schema = load_schema(schema)?;
            SchemaValidator::new(config.schema.clone()).validate_schema(&schema, &payload)
        }
        (None, None) => anyhow::bail!("either --contract or --schema is required"),
    };

    let report = json!({ "valid": valid, "errors": errors });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(valid)
}

fn read_payload(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("reading payload {}", path.display()))
        }
        None => {
            let mut payload = Vec::new();
            std::io::stdin()
                .read_to_end(&mut payload)
                .context("reading payload from stdin")?;
            Ok(payload)
        }
    }
}

/// Reads a standalone schema, recording where its `type` key sits.
fn load_schema(path: &Path) -> anyhow::Result<SchemaDefinition> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;

    let value: Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let location = locate(&content, &["type"]).unwrap_or_default();
    debug!(path = %path.display(), %location, "schema loaded");

    Ok(SchemaDefinition::from_value(value).at(location))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use theseus::SpecLocation;

    use super::*;

    fn temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_schema() {
        let file = temp(".yaml", "# pet\nrequired: [name]\ntype: object\n");
        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.value["type"], "object");
        assert_eq!(schema.location, SpecLocation::new(3, 1));
    }

    #[test]
    fn test_load_json_schema() {
        let file = temp(".json", "{\n  \"type\": \"string\"\n}");
        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.value["type"], "string");
        assert_eq!(schema.location, SpecLocation::new(2, 3));
    }

    #[test]
    fn test_read_payload_file() {
        let file = temp(".json", "{}");
        assert_eq!(read_payload(Some(file.path())).unwrap(), b"{}");
        assert!(read_payload(Some(Path::new("/nonexistent/payload.json"))).is_err());
    }
}
