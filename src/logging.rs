//! Tracing subscriber setup for the binary and for tests.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::{Result, SelectError};

/// Map `-v` count and `-q` to a default filter directive.
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the verbosity flags. Logs go to stderr, or are
/// appended to `log_file` when one is given.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity, quiet)));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| SelectError::Config(format!("logging already initialized: {e}")))
}

static TEST_INIT: Once = Once::new();

/// Install a test-writer subscriber once per process.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
