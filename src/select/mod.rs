//! The selection pipeline: which scenarios run, and on which stream.
//!
//! Steps run in a fixed order:
//! 1. validate the tag expression and stream settings
//! 2. line-number filter (when lines are given)
//! 3. tag filter (always, so inherited expressions apply)
//! 4. scenario-name filter (when names are given)
//! 5. group selection (when a group is given)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distribute::{self, DistributionStrategy};
use crate::error::{Result, SelectError};
use crate::filter;
use crate::model::{SpecCollection, Specification};
use crate::tags::validate_tag_expression;

/// Typed selection settings resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub lines: Vec<usize>,
    #[serde(default)]
    pub suite_tags: Vec<String>,
    pub parallel_streams: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
    #[serde(default)]
    pub strategy: DistributionStrategy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tags: String::new(),
            scenarios: Vec::new(),
            lines: Vec::new(),
            suite_tags: Vec::new(),
            parallel_streams: 1,
            group: None,
            strategy: DistributionStrategy::default(),
        }
    }
}

impl SelectionConfig {
    /// Check everything that can be rejected before any spec is touched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTagExpression` or `InvalidStreamCount`.
    pub fn validate(&self) -> Result<()> {
        validate_tag_expression(&self.tags)?;
        if self.parallel_streams == 0 {
            return Err(SelectError::InvalidStreamCount { count: 0 });
        }
        Ok(())
    }
}

/// Specifications chosen to run, with the strategy that will run them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Selection {
    specs: Vec<Specification>,
    strategy: DistributionStrategy,
    streams: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

impl Selection {
    /// Run the pipeline over parsed specifications.
    ///
    /// # Errors
    ///
    /// Fails before filtering anything if the configuration is invalid, or
    /// while tag filtering if an inherited expression is malformed.
    pub fn run(specs: Vec<Specification>, config: &SelectionConfig) -> Result<Self> {
        config.validate()?;
        let total = specs.len();

        let specs = if config.lines.is_empty() {
            specs
        } else {
            filter::filter_by_line_numbers(&specs, &config.lines)
        };

        let (specs, _) = filter::filter_by_tag_expression(&specs, &config.tags, &config.suite_tags)?;

        let specs = if config.scenarios.is_empty() {
            specs
        } else {
            filter::filter_by_scenario_names(&specs, &config.scenarios)
        };

        let mut selection = Self {
            specs,
            strategy: config.strategy,
            streams: config.parallel_streams,
            group: config.group,
            notice: None,
        };

        if let Some(group) = config.group {
            let picked = distribute::select_group(
                std::mem::take(&mut selection.specs),
                group,
                config.parallel_streams,
                config.strategy,
            )?;
            selection.specs = picked.specs;
            selection.strategy = picked.strategy;
            selection.notice = picked.notice;
        }

        info!(
            total,
            selected = selection.specs.len(),
            scenarios = selection.scenario_count(),
            strategy = %selection.strategy,
            "Selection complete"
        );
        Ok(selection)
    }

    #[must_use]
    pub fn specs(&self) -> &[Specification] {
        &self.specs
    }

    #[must_use]
    pub fn into_specs(self) -> Vec<Specification> {
        self.specs
    }

    #[must_use]
    pub const fn strategy(&self) -> DistributionStrategy {
        self.strategy
    }

    #[must_use]
    pub const fn group(&self) -> Option<usize> {
        self.group
    }

    /// The strategy-override notice, when group mode replaced the strategy.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.specs.iter().map(Specification::scenario_count).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Split into execution buckets.
    ///
    /// A group selection is already one stream's share and stays whole.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStreamCount` when the stream count is zero.
    pub fn distribute(self) -> Result<Vec<SpecCollection>> {
        if self.group.is_some() {
            debug!("Group selection runs as a single stream");
            return Ok(vec![SpecCollection::new(self.specs)]);
        }
        distribute::distribute(self.specs, self.streams)
    }
}
