//! Select command implementation.

use std::env;

use serde::Serialize;
use tracing::debug;

use crate::cli::SelectArgs;
use crate::config::{self, CliOverrides};
use crate::distribute::DistributionStrategy;
use crate::error::Result;
use crate::model::{SpecCollection, Specification};
use crate::select::Selection;

#[derive(Serialize)]
struct SelectOutput {
    strategy: DistributionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
    scenario_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    specs: Option<Vec<Specification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    streams: Option<Vec<SpecCollection>>,
}

fn overrides_from(args: &SelectArgs) -> CliOverrides {
    CliOverrides {
        tags: args.tags.clone(),
        scenarios: args.scenarios.clone(),
        lines: args.lines.clone(),
        parallel_streams: args.parallel_streams,
        group: args.group,
        strategy: args.strategy.map(Into::into),
    }
}

/// Execute the select command.
///
/// Prints the selected specifications, or one entry per stream when more
/// than one stream is configured without a group.
///
/// # Errors
///
/// Returns an error if the input or config cannot be read, or selection fails.
pub fn execute(args: &SelectArgs, config_path: Option<&std::path::PathBuf>) -> Result<()> {
    let cwd = env::current_dir()?;
    let layer = config::load_config(config_path, &cwd, &overrides_from(args))?;
    let selection_config = layer.to_selection_config()?;
    debug!(?selection_config, "Resolved selection config");

    let specs: Vec<Specification> = super::read_json(&args.specs)?;
    let selection = Selection::run(specs, &selection_config)?;

    let strategy = selection.strategy();
    let group = selection.group();
    let notice = selection.notice().map(str::to_string);
    let scenario_count = selection.scenario_count();

    let (specs, streams) = if group.is_none() && selection_config.parallel_streams > 1 {
        (None, Some(selection.distribute()?))
    } else {
        (Some(selection.into_specs()), None)
    };

    super::print_json(&SelectOutput {
        strategy,
        group,
        notice,
        scenario_count,
        specs,
        streams,
    })
}
