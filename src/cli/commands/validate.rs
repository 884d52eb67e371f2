//! Validate command implementation.

use serde::Serialize;

use crate::error::Result;
use crate::tags::TagExpression;

#[derive(Serialize)]
struct ValidateOutput<'a> {
    expression: &'a str,
    valid: bool,
    operands: &'a [String],
}

/// Execute the validate command.
///
/// # Errors
///
/// Returns `InvalidTagExpression` if the expression is malformed.
pub fn execute(expression: &str, json: bool) -> Result<()> {
    let parsed = TagExpression::parse(expression)?;

    if json {
        return super::print_json(&ValidateOutput {
            expression,
            valid: true,
            operands: parsed.operands(),
        });
    }

    if parsed.is_empty() {
        println!("ok (empty expression matches everything)");
    } else {
        println!("ok: {} tag(s): {}", parsed.operands().len(), parsed.operands().join(", "));
    }
    Ok(())
}
