//! Scenario selection over parsed specifications.
//!
//! - [`ScenarioPredicate`] decides per scenario.
//! - [`partition`] splits one specification into matched and excluded halves.
//! - The `filter_by_*` functions apply a predicate across a spec list and
//!   drop specifications left without scenarios.

mod predicate;

pub use predicate::{ScenarioPredicate, TagFilter};

use std::collections::HashMap;
use std::convert::Infallible;

use tracing::{debug, warn};

use crate::error::{Result, StructuredError};
use crate::model::{Item, Scenario, Specification};

/// Split `spec` into `(kept, excluded)` by `predicate`.
///
/// Every non-scenario item is copied into both halves in original order.
/// Each scenario lands in exactly one half, keeping relative order.
///
/// # Errors
///
/// Propagates predicate failures (a malformed inherited tag expression).
pub fn partition(
    spec: &Specification,
    predicate: &ScenarioPredicate,
) -> Result<(Specification, Specification)> {
    split_by(spec, |scenario| predicate.excludes(spec, scenario))
}

fn split_by<E>(
    spec: &Specification,
    mut excludes: impl FnMut(&Scenario) -> std::result::Result<bool, E>,
) -> std::result::Result<(Specification, Specification), E> {
    let mut kept = spec.without_items();
    let mut excluded = spec.without_items();

    for item in &spec.items {
        match item {
            Item::Scenario(scenario) => {
                if excludes(scenario)? {
                    excluded.items.push(item.clone());
                } else {
                    kept.items.push(item.clone());
                }
            }
            Item::Step(_) | Item::Comment(_) | Item::Table(_) | Item::Tags(_) | Item::TearDown(_) => {
                kept.items.push(item.clone());
                excluded.items.push(item.clone());
            }
        }
    }

    Ok((kept, excluded))
}

/// Partition every spec by `predicate`, keeping only halves with scenarios.
fn partition_all(
    specs: &[Specification],
    predicate: &ScenarioPredicate,
) -> Result<(Vec<Specification>, Vec<Specification>)> {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for spec in specs {
        let (kept, excluded) = partition(spec, predicate)?;
        if kept.has_scenarios() {
            matched.push(kept);
        }
        if excluded.has_scenarios() {
            unmatched.push(excluded);
        }
    }
    Ok((matched, unmatched))
}

/// Keep the scenarios `excludes` lets through, dropping specs left empty.
fn retain_scenarios(
    specs: &[Specification],
    excludes: impl Fn(&Scenario) -> bool,
) -> Vec<Specification> {
    specs
        .iter()
        .filter_map(|spec| {
            let Ok((kept, _)) = split_by::<Infallible>(spec, |scenario| Ok(excludes(scenario)));
            kept.has_scenarios().then_some(kept)
        })
        .collect()
}

/// Select scenarios by tag expression.
///
/// Returns `(matched, unmatched)`. The matched set has its data-table row
/// indices renumbered locally (see [`renumber_table_rows`]); the unmatched
/// set keeps whatever indices it had.
///
/// # Errors
///
/// Returns `SelectError::InvalidTagExpression` if `expression` or any
/// inherited expression is malformed.
pub fn filter_by_tag_expression(
    specs: &[Specification],
    expression: &str,
    suite_tags: &[String],
) -> Result<(Vec<Specification>, Vec<Specification>)> {
    let predicate = ScenarioPredicate::ByTagExpression(TagFilter::new(expression, suite_tags)?);
    let (mut matched, unmatched) = partition_all(specs, &predicate)?;
    renumber_table_rows(&mut matched);
    debug!(
        expression,
        matched = matched.len(),
        unmatched = unmatched.len(),
        "Applied tag filter"
    );
    Ok((matched, unmatched))
}

/// Keep only scenarios whose heading is one of `names`.
///
/// Names that match no scenario in any input spec are dropped with a
/// warning. Specs left without scenarios are discarded.
#[must_use]
pub fn filter_by_scenario_names(specs: &[Specification], names: &[String]) -> Vec<Specification> {
    let existing = all_scenario_headings(specs);
    let valid: Vec<String> = names
        .iter()
        .filter(|name| {
            let found = existing.contains(*name);
            if !found {
                let report = StructuredError::scenario_not_found(name, &existing);
                warn!(
                    hint = report.hint.as_deref().unwrap_or(""),
                    "Warning: {}", report.message
                );
            }
            found
        })
        .cloned()
        .collect();

    debug!(names = %valid.join(", "), "Applying scenarios filter");
    retain_scenarios(specs, |scenario| !scenario.has_any_heading(&valid))
}

/// Keep only scenarios whose line span contains one of `lines`.
#[must_use]
pub fn filter_by_line_numbers(specs: &[Specification], lines: &[usize]) -> Vec<Specification> {
    debug!(?lines, "Applying line number filter");
    retain_scenarios(specs, |scenario| predicate::outside_lines(lines, scenario))
}

/// Every scenario heading across `specs`, in order, duplicates included.
#[must_use]
pub fn all_scenario_headings(specs: &[Specification]) -> Vec<String> {
    specs
        .iter()
        .flat_map(Specification::scenarios)
        .map(|scenario| scenario.heading.clone())
        .collect()
}

/// Number data-table row instances in first-seen order.
///
/// Spec-table rows get one counter per file identity: every distinct row
/// seen in a specification instance takes the next index, so instances split
/// across several specifications and rows held by one specification are
/// numbered the same way. Scenario-table rows are then numbered per
/// originating scenario (see [`assign_scenario_table_rows`]).
pub fn renumber_table_rows(specs: &mut [Specification]) {
    let mut next_spec_row: HashMap<String, usize> = HashMap::new();
    for spec in specs.iter_mut() {
        let counter = next_spec_row.entry(spec.file_name.clone()).or_insert(0);
        let mut assigned: HashMap<usize, usize> = HashMap::new();
        for scenario in spec.scenarios_mut() {
            let index = *assigned
                .entry(scenario.spec_data_table_row_index)
                .or_insert_with(|| {
                    let next = *counter;
                    *counter += 1;
                    next
                });
            scenario.spec_data_table_row_index = index;
        }
        assign_scenario_table_rows(spec);
    }
}

/// Number the scenario-table row instances of one specification, keyed by
/// the spec-table row and the originating scenario's span start, in
/// first-seen order.
pub fn assign_scenario_table_rows(spec: &mut Specification) {
    let mut next_row: HashMap<(usize, usize), usize> = HashMap::new();
    for scenario in spec.scenarios_mut() {
        let key = (scenario.spec_data_table_row_index, scenario.span.start);
        let counter = next_row.entry(key).or_insert(0);
        scenario.scenario_data_table_row_index = *counter;
        *counter += 1;
    }
}
