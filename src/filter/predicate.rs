//! Scenario predicates: the rules that decide whether a scenario is kept.

use tracing::trace;

use crate::error::Result;
use crate::model::{Scenario, Specification};
use crate::tags::{TagExpression, TagSet};

/// Tag-based selection: the run expression plus suite-scope tags.
///
/// A scenario passes only when the run expression, the specification's
/// inherited expression and the scenario's inherited expression all hold
/// against the same tag universe.
#[derive(Debug, Clone)]
pub struct TagFilter {
    expression: TagExpression,
    suite_tags: Vec<String>,
}

impl TagFilter {
    /// # Errors
    ///
    /// Returns `SelectError::InvalidTagExpression` if `expression` is malformed.
    pub fn new(expression: &str, suite_tags: &[String]) -> Result<Self> {
        Ok(Self {
            expression: TagExpression::parse(expression)?,
            suite_tags: suite_tags.to_vec(),
        })
    }

    #[must_use]
    pub fn expression(&self) -> &TagExpression {
        &self.expression
    }

    /// Suite tags, specification tags, scenario tags and data-row tags.
    #[must_use]
    pub fn universe(&self, spec: &Specification, scenario: &Scenario) -> TagSet {
        let mut set: TagSet = self.suite_tags.iter().collect();
        set.extend(spec.tags.values());
        set.extend(scenario.tags.values());
        set.extend(scenario.row_tags());
        set
    }

    /// # Errors
    ///
    /// Returns `SelectError::InvalidTagExpression` if an inherited expression
    /// on the specification or scenario is malformed.
    pub fn matches(&self, spec: &Specification, scenario: &Scenario) -> Result<bool> {
        let universe = self.universe(spec, scenario);
        if !self.expression.matches(&universe) {
            return Ok(false);
        }
        for inherited in [&spec.filter_expression, &scenario.filter_expression]
            .into_iter()
            .flatten()
        {
            if !TagExpression::parse(inherited)?.matches(&universe) {
                trace!(
                    scenario = %scenario.heading,
                    expression = %inherited,
                    "Inherited filter rejected scenario"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// The closed set of scenario selection rules.
#[derive(Debug, Clone)]
pub enum ScenarioPredicate {
    /// Keep scenarios whose line span contains one of these lines.
    BySpan(Vec<usize>),
    /// Keep scenarios whose heading is one of these names.
    ByName(Vec<String>),
    /// Keep scenarios satisfying the composed tag rule.
    ByTagExpression(TagFilter),
}

impl ScenarioPredicate {
    /// Whether `scenario` belongs in the excluded half.
    ///
    /// # Errors
    ///
    /// Only the tag variant can fail, when an inherited expression is malformed.
    pub fn excludes(&self, spec: &Specification, scenario: &Scenario) -> Result<bool> {
        match self {
            Self::BySpan(lines) => Ok(outside_lines(lines, scenario)),
            Self::ByName(names) => Ok(!scenario.has_any_heading(names)),
            Self::ByTagExpression(filter) => filter.matches(spec, scenario).map(|keep| !keep),
        }
    }
}

/// True when no line in `lines` falls inside the scenario's span.
pub(super) fn outside_lines(lines: &[usize], scenario: &Scenario) -> bool {
    !lines.iter().any(|line| scenario.in_span(*line))
}
