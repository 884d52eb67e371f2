//! Structured error output for tooling that drives the harness.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

#![allow(clippy::option_if_let_else)]

use crate::error::SelectError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Selection Errors (exit code 3) ===
    /// Tag expression failed to parse
    InvalidTagExpression,
    /// Stream count below one
    InvalidStreamCount,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTagExpression => "INVALID_TAG_EXPRESSION",
            Self::InvalidStreamCount => "INVALID_STREAM_COUNT",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
        }
    }

    /// Whether the caller might succeed by fixing the input and retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidTagExpression | Self::InvalidStreamCount | Self::ValidationFailed
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 3: Selection errors
    /// - 4: Validation errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidTagExpression | Self::InvalidStreamCount => 3,
            Self::ValidationFailed => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `SelectError`.
    #[must_use]
    pub fn from_error(err: &SelectError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(ToString::to_string);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Create a structured report for a requested scenario heading that
    /// matched nothing, with close headings as suggestions.
    #[must_use]
    pub fn scenario_not_found(searched: &str, existing: &[String]) -> Self {
        let similar = find_similar_names(searched, existing, 3);

        let hint = if similar.is_empty() {
            None
        } else if similar.len() == 1 {
            Some(format!("Did you mean '{}'?", similar[0]))
        } else {
            Some(format!("Did you mean one of: {}?", similar.join(", ")))
        };

        Self {
            code: ErrorCode::ValidationFailed,
            message: format!("scenario name - \"{searched}\" not found"),
            hint,
            retryable: false,
            context: Some(json!({
                "searched": searched,
                "similar": similar,
            })),
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &SelectError) -> (ErrorCode, Option<Value>) {
        match err {
            SelectError::InvalidTagExpression { expression, reason } => (
                ErrorCode::InvalidTagExpression,
                Some(json!({"expression": expression, "reason": reason})),
            ),
            SelectError::InvalidStreamCount { count } => (
                ErrorCode::InvalidStreamCount,
                Some(json!({"count": count})),
            ),
            SelectError::Config(_) => (ErrorCode::ConfigError, None),
            SelectError::Io(_) => (ErrorCode::IoError, None),
            SelectError::Json(_) => (ErrorCode::JsonError, None),
            SelectError::Yaml(_) => (ErrorCode::YamlError, None),
        }
    }
}

/// Calculate the Levenshtein distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }
    for (j, item) in matrix[0].iter_mut().enumerate().take(b_len + 1) {
        *item = j;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    for (i, a_char) in a_chars.iter().enumerate() {
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[a_len][b_len]
}

/// Find names close to `searched` by Levenshtein distance.
///
/// Returns up to `max_suggestions` distinct names with distance <= 3.
#[must_use]
pub fn find_similar_names(
    searched: &str,
    existing: &[String],
    max_suggestions: usize,
) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|name| (levenshtein_distance(searched, name), name.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    candidates.dedup_by(|a, b| a.1 == b.1);

    candidates
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.to_string())
        .collect()
}
