//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::distribute::DistributionStrategy;

pub mod commands;

/// Select, distribute and aggregate spec-driven test scenarios
#[derive(Parser, Debug)]
#[command(name = "ssel", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./ssel.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a tag expression is well formed
    Validate {
        /// Tag expression
        expression: String,
    },

    /// Evaluate a tag expression against a list of tags
    Eval {
        /// Tag expression
        expression: String,

        /// Tags present on the entity
        tags: Vec<String>,
    },

    /// Filter specifications and split them across streams
    Select(SelectArgs),

    /// Fold scenario results into a specification result
    Aggregate(AggregateArgs),

    /// Print JSON schemas for input and output documents
    Schema(SchemaArgs),
}

/// Strategy flag values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Lazy,
    Eager,
}

impl From<StrategyArg> for DistributionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Lazy => Self::Lazy,
            StrategyArg::Eager => Self::Eager,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// JSON file holding an array of parsed specifications
    pub specs: PathBuf,

    /// Tag expression
    #[arg(long, short = 't')]
    pub tags: Option<String>,

    /// Scenario heading to run (repeatable)
    #[arg(long = "scenario", short = 's')]
    pub scenarios: Vec<String>,

    /// Line number inside a scenario to run (repeatable)
    #[arg(long = "line", short = 'l')]
    pub lines: Vec<usize>,

    /// Number of parallel execution streams
    #[arg(long = "parallel-streams", short = 'n')]
    pub parallel_streams: Option<usize>,

    /// Run only this 1-based group of the stream split
    #[arg(long, short = 'g')]
    pub group: Option<usize>,

    /// Distribution strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AggregateArgs {
    /// JSON file with `spec` and `scenarios` fields
    pub results: PathBuf,
}

/// Documents with a published schema.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    All,
    Specification,
    ScenarioResult,
    SpecResult,
    Selection,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Which schema to print
    #[arg(value_enum, default_value = "all")]
    pub target: SchemaTarget,
}
