//! Stream distribution: splitting specifications across parallel streams.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SelectError};
use crate::model::{SpecCollection, Specification};

/// How the execution driver hands specifications to streams.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStrategy {
    /// Streams pull the next specification when they become free.
    #[default]
    Lazy,
    /// Specifications are assigned to streams up front, round-robin.
    Eager,
}

impl DistributionStrategy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lazy => "lazy",
            Self::Eager => "eager",
        }
    }
}

impl fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionStrategy {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(SelectError::Config(format!(
                "unknown distribution strategy '{other}' (expected lazy or eager)"
            ))),
        }
    }
}

/// Notice emitted when group mode replaces the configured strategy.
pub const EAGER_OVERRIDE_NOTICE: &str =
    "Using the -g flag will make the distribution strategy 'eager'. The --strategy setting will be overridden.";

/// Outcome of selecting one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GroupSelection {
    pub group: usize,
    pub specs: Vec<Specification>,
    /// Strategy in force after group mode was applied. Always eager.
    pub strategy: DistributionStrategy,
    /// The override notice, when the configured strategy was not already eager.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Round-robin `specs` into exactly `streams` buckets.
///
/// The spec at index `i` lands in bucket `i % streams`. Buckets with no
/// specs are still returned.
///
/// # Errors
///
/// Returns `SelectError::InvalidStreamCount` when `streams` is zero.
pub fn distribute(specs: Vec<Specification>, streams: usize) -> Result<Vec<SpecCollection>> {
    if streams == 0 {
        return Err(SelectError::InvalidStreamCount { count: streams });
    }

    let total = specs.len();
    let mut buckets: Vec<SpecCollection> = (0..streams).map(|_| SpecCollection::default()).collect();
    for (index, spec) in specs.into_iter().enumerate() {
        buckets[index % streams].add(spec);
    }

    debug!(specs = total, streams, "Distributed specifications");
    Ok(buckets)
}

/// Pick the 1-based `group` of a round-robin split over `streams`.
///
/// A group outside `1..=streams` selects nothing. Group mode always forces
/// the eager strategy; when `configured` differs an `info!` notice is
/// emitted and recorded on the result.
///
/// # Errors
///
/// Returns `SelectError::InvalidStreamCount` when `streams` is zero.
pub fn select_group(
    specs: Vec<Specification>,
    group: usize,
    streams: usize,
    configured: DistributionStrategy,
) -> Result<GroupSelection> {
    if streams == 0 {
        return Err(SelectError::InvalidStreamCount { count: streams });
    }

    let notice = (configured != DistributionStrategy::Eager).then(|| {
        info!("{EAGER_OVERRIDE_NOTICE}");
        EAGER_OVERRIDE_NOTICE.to_string()
    });

    let selected = if (1..=streams).contains(&group) {
        debug!(group, "Applying group filter");
        distribute(specs, streams)?
            .into_iter()
            .nth(group - 1)
            .map(SpecCollection::into_specs)
            .unwrap_or_default()
    } else {
        debug!(group, streams, "Group out of range, nothing selected");
        Vec::new()
    };

    Ok(GroupSelection {
        group,
        specs: selected,
        strategy: DistributionStrategy::Eager,
        notice,
    })
}
