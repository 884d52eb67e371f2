//! Tag expression evaluation.
//!
//! A tag expression combines tag names with `&` (or `,`), `|`, `!` and
//! parentheses. Whitespace is ignored everywhere, so `foo bar` names the
//! tag `foobar`. Names that a boolean parser would read as a literal
//! (`true`, `F`, `1`, ...) are escaped on both sides so they stay tags.

mod lexer;
mod parser;

pub use lexer::{Token, normalize_tag};

use std::collections::HashSet;

use tracing::trace;

use crate::error::{Result, SelectError};
use parser::Expr;

/// A set of tag names in normalized form, ready for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    names: HashSet<String>,
}

impl TagSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag name. The name is normalized first.
    pub fn insert(&mut self, name: &str) {
        self.names.insert(normalize_tag(name));
    }

    /// Whether the normalized form of `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize_tag(name))
    }

    fn contains_normalized(&self, normalized: &str) -> bool {
        self.names.contains(normalized)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}

/// A parsed and validated tag expression.
#[derive(Debug, Clone)]
pub struct TagExpression {
    raw: String,
    tree: Option<Expr>,
    operands: Vec<String>,
}

impl TagExpression {
    /// Parse `raw`, rejecting malformed expressions.
    ///
    /// An expression that is empty after whitespace removal parses to a
    /// filter that matches everything.
    ///
    /// # Errors
    ///
    /// Returns `SelectError::InvalidTagExpression` carrying `raw` verbatim.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = lexer::normalize_expression(raw);
        if normalized.contains('^') {
            return Err(SelectError::tag_expression(raw, "unsupported operator '^'"));
        }

        let (tokens, operands) = lexer::tokenize(&normalized);
        let tree = if tokens.is_empty() {
            None
        } else {
            Some(parser::parse(&tokens).map_err(|reason| SelectError::tag_expression(raw, reason))?)
        };

        trace!(expression = raw, normalized = %normalized, "Parsed tag expression");
        Ok(Self {
            raw: raw.to_string(),
            tree,
            operands,
        })
    }

    /// The expression text as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Distinct operand names in normalized form, in first-seen order.
    #[must_use]
    pub fn operands(&self) -> &[String] {
        &self.operands
    }

    /// True when the expression has no operands and matches everything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Evaluate against a set of present tags.
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        let Some(tree) = &self.tree else {
            return true;
        };
        let result = tree.eval(&|name| tags.contains_normalized(name));
        trace!(expression = %self.raw, result, "Evaluated tag expression");
        result
    }
}

/// Evaluate `expression` against `tags` in one step.
///
/// # Errors
///
/// Returns `SelectError::InvalidTagExpression` if the expression is malformed.
pub fn evaluate<S: AsRef<str>>(expression: &str, tags: &[S]) -> Result<bool> {
    let parsed = TagExpression::parse(expression)?;
    let set: TagSet = tags.iter().collect::<TagSet>();
    Ok(parsed.matches(&set))
}

/// Check that `expression` is well formed without matching it.
///
/// # Errors
///
/// Returns `SelectError::InvalidTagExpression` if the expression is malformed.
pub fn validate_tag_expression(expression: &str) -> Result<()> {
    TagExpression::parse(expression).map(|_| ())
}
