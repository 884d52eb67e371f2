use clap::Parser;
use scenario_select::cli::commands;
use scenario_select::cli::{Cli, Commands};
use scenario_select::logging::init_logging;
use scenario_select::{SelectError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match &cli.command {
        Commands::Validate { expression } => commands::validate::execute(expression, cli.json),
        Commands::Eval { expression, tags } => commands::eval::execute(expression, tags, cli.json),
        Commands::Select(args) => commands::select::execute(args, cli.config.as_ref()),
        Commands::Aggregate(args) => commands::aggregate::execute(args, cli.json),
        Commands::Schema(args) => commands::schema::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &SelectError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
