//! Error types and handling for `scenario_select`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for tooling that drives the harness

mod structured;

pub use structured::{ErrorCode, StructuredError, find_similar_names};

use thiserror::Error;

/// Primary error type for selection, distribution and aggregation.
#[derive(Error, Debug)]
pub enum SelectError {
    // === Tag Expression Errors ===
    /// The tag expression could not be parsed or evaluated.
    ///
    /// `expression` is the text exactly as the user supplied it.
    #[error("invalid expression: `{expression}`: {reason}")]
    InvalidTagExpression { expression: String, reason: String },

    // === Distribution Errors ===
    /// Streams must be at least one.
    #[error("Invalid stream count: {count} (must be at least 1)")]
    InvalidStreamCount { count: usize },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SelectError {
    /// Build a tag expression error for the raw user input.
    #[must_use]
    pub fn tag_expression(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTagExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidTagExpression { .. } => Some(
                "Combine tag names with & (or ,), | and !, and balance every parenthesis",
            ),
            Self::InvalidStreamCount { .. } => Some("Use --parallel-streams 1 or greater"),
            Self::Config(_) => Some("Check ssel.yaml and SSEL_* environment variables"),
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => None,
        }
    }
}

/// Result type using `SelectError`.
pub type Result<T> = std::result::Result<T, SelectError>;
