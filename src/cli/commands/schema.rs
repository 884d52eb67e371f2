//! Schema command implementation.

use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::{Map, Value};

use crate::cli::{SchemaArgs, SchemaTarget};
use crate::error::Result;
use crate::model::Specification;
use crate::result::{ScenarioResult, SpecResult};
use crate::select::Selection;

fn schema(target: SchemaTarget) -> Option<RootSchema> {
    match target {
        SchemaTarget::Specification => Some(schema_for!(Vec<Specification>)),
        SchemaTarget::ScenarioResult => Some(schema_for!(ScenarioResult)),
        SchemaTarget::SpecResult => Some(schema_for!(SpecResult)),
        SchemaTarget::Selection => Some(schema_for!(Selection)),
        SchemaTarget::All => None,
    }
}

/// Execute the schema command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &SchemaArgs) -> Result<()> {
    if let Some(root) = schema(args.target) {
        return super::print_json(&root);
    }

    let mut all = Map::new();
    for (name, target) in [
        ("specification", SchemaTarget::Specification),
        ("scenario_result", SchemaTarget::ScenarioResult),
        ("spec_result", SchemaTarget::SpecResult),
        ("selection", SchemaTarget::Selection),
    ] {
        if let Some(root) = schema(target) {
            all.insert(name.to_string(), serde_json::to_value(root)?);
        }
    }
    super::print_json(&Value::Object(all))
}
