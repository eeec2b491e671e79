//! `theseus resolve`

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use theseus::{Theseus, TheseusConfig};

/// Arguments for `theseus resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// OpenAPI contract (JSON or YAML).
    #[arg(short, long, env = "THESEUS_CONTRACT")]
    pub contract: PathBuf,

    /// Request method, e.g. GET.
    pub method: String,

    /// Request path, e.g. /pets/42.
    pub path: String,
}

/// Prints the resolution as JSON. Returns whether the request resolved.
pub fn execute(args: &ResolveArgs, config: &TheseusConfig) -> anyhow::Result<bool> {
    let theseus = Theseus::from_file(&args.contract, config)
        .with_context(|| format!("loading contract {}", args.contract.display()))?;
    let method = crate::parse_method(&args.method)?;

    let resolution = theseus.resolve(&method, &args.path);
    println!("{}", serde_json::to_string_pretty(&resolution)?);

    Ok(resolution.matched)
}
