//! Eval command implementation.

use serde::Serialize;

use crate::error::Result;
use crate::tags::evaluate;

#[derive(Serialize)]
struct EvalOutput<'a> {
    expression: &'a str,
    tags: &'a [String],
    result: bool,
}

/// Execute the eval command.
///
/// # Errors
///
/// Returns `InvalidTagExpression` if the expression is malformed.
pub fn execute(expression: &str, tags: &[String], json: bool) -> Result<()> {
    let result = evaluate(expression, tags)?;

    if json {
        return super::print_json(&EvalOutput {
            expression,
            tags,
            result,
        });
    }

    println!("{result}");
    Ok(())
}
