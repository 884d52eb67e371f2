//! Aggregate command implementation.

use serde::Deserialize;

use crate::cli::AggregateArgs;
use crate::error::Result;
use crate::model::Specification;
use crate::result::{HookFailure, ScenarioResult, SpecResult};

/// Input document: one specification and the outcomes of its scenarios.
#[derive(Deserialize)]
struct AggregateInput {
    spec: Specification,
    #[serde(default)]
    scenarios: Vec<ScenarioResult>,
    #[serde(default)]
    pre_hook_failures: Vec<HookFailure>,
    #[serde(default)]
    post_hook_failures: Vec<HookFailure>,
}

/// Execute the aggregate command.
///
/// The result is always printed as JSON; without `--json` a one-line
/// summary follows on stderr.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed.
pub fn execute(args: &AggregateArgs, json: bool) -> Result<()> {
    let input: AggregateInput = super::read_json(&args.results)?;

    let mut result = SpecResult::new(&input.spec);
    if !input.pre_hook_failures.is_empty() {
        result.set_failure();
        result.add_pre_hook(input.pre_hook_failures);
    }
    result.add_scenario_results(&input.scenarios);
    if !input.post_hook_failures.is_empty() {
        result.set_failure();
        result.add_post_hook(input.post_hook_failures);
    }
    if !input.scenarios.is_empty() && input.scenarios.iter().all(ScenarioResult::is_skipped) {
        result.set_skipped(!result.is_failed);
    }

    super::print_json(&result)?;
    if !json {
        eprintln!(
            "{}: {} scenario(s), {} failed, {} skipped, {} ms",
            result.heading,
            result.scenario_count,
            result.scenario_failed_count,
            result.scenario_skipped_count,
            result.execution_time_ms
        );
    }
    Ok(())
}
