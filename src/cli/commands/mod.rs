//! Subcommand implementations.

pub mod aggregate;
pub mod eval;
pub mod schema;
pub mod select;
pub mod validate;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Read and deserialize a JSON document.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}
