//! Execution results and their aggregation per specification and suite.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Scenario, Span, Specification};

/// Outcome of one scenario instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Passed,
    Failed,
    Skipped,
}

/// A failure raised by a suite-level hook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct HookFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stack_trace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_file: Option<String>,
}

impl HookFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Outcome of one scenario instance as reported by the execution step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioResult {
    pub heading: String,
    pub span: Span,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hook_messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_hook_messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hook_screenshot_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_hook_screenshot_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default)]
    pub spec_data_table_row_index: usize,
    #[serde(default)]
    pub scenario_data_table_row_index: usize,
    #[serde(default)]
    pub is_spec_table_driven: bool,
    #[serde(default)]
    pub is_scenario_table_driven: bool,
}

impl ScenarioResult {
    /// Seed a passing result from the scenario instance it reports on.
    #[must_use]
    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self {
            heading: scenario.heading.clone(),
            span: scenario.span,
            spec_data_table_row_index: scenario.spec_data_table_row_index,
            scenario_data_table_row_index: scenario.scenario_data_table_row_index,
            is_spec_table_driven: scenario.is_spec_table_driven(),
            is_scenario_table_driven: scenario.is_scenario_table_driven(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_execution_time(mut self, millis: u64) -> Self {
        self.execution_time_ms = millis;
        self
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.status == ExecutionStatus::Skipped
    }

    #[must_use]
    pub const fn is_table_driven(&self) -> bool {
        self.is_spec_table_driven || self.is_scenario_table_driven
    }

    /// Render the output item for this result.
    #[must_use]
    pub fn to_item(&self) -> ResultItem {
        let scenario = ScenarioItem {
            heading: self.heading.clone(),
            status: self.status,
            execution_time_ms: self.execution_time_ms,
            skip_reasons: self.skip_reasons.clone(),
            errors: self.errors.clone(),
            pre_hook_messages: self.pre_hook_messages.clone(),
            post_hook_messages: self.post_hook_messages.clone(),
        };
        if self.is_table_driven() {
            ResultItem::TableDrivenScenario(TableDrivenScenarioItem {
                scenario,
                is_spec_table_driven: self.is_spec_table_driven,
                is_scenario_table_driven: self.is_scenario_table_driven,
                table_row_index: self.spec_data_table_row_index,
                scenario_table_row_index: self.scenario_data_table_row_index,
            })
        } else {
            ResultItem::Scenario(scenario)
        }
    }
}

/// Rendered scenario outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioItem {
    pub heading: String,
    pub status: ExecutionStatus,
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hook_messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_hook_messages: Vec<String>,
}

/// Rendered outcome of one data-table row instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDrivenScenarioItem {
    pub scenario: ScenarioItem,
    pub is_spec_table_driven: bool,
    pub is_scenario_table_driven: bool,
    pub table_row_index: usize,
    pub scenario_table_row_index: usize,
}

/// Output item of a specification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultItem {
    Scenario(ScenarioItem),
    TableDrivenScenario(TableDrivenScenarioItem),
    Comment(String),
}

/// Aggregate result of one specification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SpecResult {
    pub heading: String,
    pub file_name: String,
    pub items: Vec<ResultItem>,
    pub scenario_count: usize,
    pub scenario_failed_count: usize,
    pub scenario_skipped_count: usize,
    pub is_failed: bool,
    pub skipped: bool,
    pub failed_data_table_rows: Vec<usize>,
    pub skipped_data_table_rows: Vec<usize>,
    pub execution_time_ms: u64,
    pub pre_hook_failures: Vec<HookFailure>,
    pub post_hook_failures: Vec<HookFailure>,
    pub errors: Vec<String>,
}

impl SpecResult {
    #[must_use]
    pub fn new(spec: &Specification) -> Self {
        Self {
            heading: spec.heading.clone(),
            file_name: spec.file_name.clone(),
            ..Self::default()
        }
    }

    pub fn set_failure(&mut self) {
        self.is_failed = true;
    }

    pub fn set_skipped(&mut self, skipped: bool) {
        self.skipped = skipped;
    }

    pub fn add_exec_time(&mut self, millis: u64) {
        self.execution_time_ms += millis;
    }

    pub fn add_spec_items(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    pub fn add_pre_hook(&mut self, failures: impl IntoIterator<Item = HookFailure>) {
        self.pre_hook_failures.extend(failures);
    }

    pub fn add_post_hook(&mut self, failures: impl IntoIterator<Item = HookFailure>) {
        self.post_hook_failures.extend(failures);
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = String>) {
        self.errors.extend(errors);
    }

    /// Fold scenario outcomes into this result, in order.
    ///
    /// Spec-table instances of the same scenario (same span start) count as
    /// one scenario. Scenario-table instances each count.
    pub fn add_scenario_results(&mut self, results: &[ScenarioResult]) {
        let mut counted_spans: HashSet<usize> = HashSet::new();

        for result in results {
            self.add_exec_time(result.execution_time_ms);

            let spec_row_related = result.is_spec_table_driven;
            let dedup = spec_row_related && !result.is_scenario_table_driven;
            if !dedup || counted_spans.insert(result.span.start) {
                self.scenario_count += 1;
            }

            if result.is_failed() {
                self.set_failure();
                self.scenario_failed_count += 1;
                if spec_row_related {
                    self.failed_data_table_rows
                        .push(result.spec_data_table_row_index);
                }
            } else if result.is_skipped() {
                self.scenario_skipped_count += 1;
                if spec_row_related {
                    self.skipped_data_table_rows
                        .push(result.spec_data_table_row_index);
                }
            }

            self.items.push(result.to_item());
        }

        debug!(
            spec = %self.heading,
            scenarios = self.scenario_count,
            failed = self.scenario_failed_count,
            skipped = self.scenario_skipped_count,
            "Aggregated scenario results"
        );
    }
}

/// Results of every stream joined after all streams finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteResult {
    pub spec_results: Vec<SpecResult>,
    pub execution_time_ms: u64,
    pub specs_failed_count: usize,
    pub specs_skipped_count: usize,
    pub is_failed: bool,
    pub timestamp: DateTime<Utc>,
}

impl SuiteResult {
    /// Concatenate per-stream results in stream order.
    #[must_use]
    pub fn join(streams: Vec<Vec<SpecResult>>) -> Self {
        let spec_results: Vec<SpecResult> = streams.into_iter().flatten().collect();
        let execution_time_ms = spec_results.iter().map(|r| r.execution_time_ms).sum();
        let specs_failed_count = spec_results.iter().filter(|r| r.is_failed).count();
        let specs_skipped_count = spec_results
            .iter()
            .filter(|r| r.skipped && !r.is_failed)
            .count();

        Self {
            is_failed: specs_failed_count > 0,
            spec_results,
            execution_time_ms,
            specs_failed_count,
            specs_skipped_count,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::model::{Table, TableCell};
    use tracing::info;

    fn row_table() -> Table {
        Table::new(
            vec!["id".into()],
            vec![
                vec![TableCell::text("a")],
                vec![TableCell::text("b")],
                vec![TableCell::text("c")],
            ],
            2,
        )
    }

    fn spec_table_instances() -> Vec<ScenarioResult> {
        let table = row_table();
        (0..3)
            .map(|row| {
                let mut scenario = Scenario::new("Driven", Span::new(5, 9))
                    .with_spec_row(table.materialize_row(row).unwrap());
                scenario.spec_data_table_row_index = row;
                ScenarioResult::for_scenario(&scenario).with_execution_time(10)
            })
            .collect()
    }

    fn scenario_table_instances() -> Vec<ScenarioResult> {
        let table = row_table();
        (0..3)
            .map(|row| {
                let mut scenario = Scenario::new("Driven", Span::new(5, 9))
                    .with_scenario_row(table.materialize_row(row).unwrap());
                scenario.scenario_data_table_row_index = row;
                ScenarioResult::for_scenario(&scenario).with_execution_time(10)
            })
            .collect()
    }

    #[test]
    fn spec_table_instances_count_once() {
        init_test_logging();
        info!("spec_table_instances_count_once: starting");
        let mut results = spec_table_instances();
        results[1].status = ExecutionStatus::Failed;

        let mut spec_result = SpecResult::new(&Specification::new("Spec", "a.spec"));
        spec_result.add_scenario_results(&results);

        assert_eq!(spec_result.scenario_count, 1);
        assert_eq!(spec_result.scenario_failed_count, 1);
        assert_eq!(spec_result.failed_data_table_rows, vec![1]);
        assert!(spec_result.is_failed);
        assert_eq!(spec_result.execution_time_ms, 30);
        assert_eq!(spec_result.items.len(), 3);
        info!("spec_table_instances_count_once: assertions passed");
    }

    #[test]
    fn scenario_table_instances_count_individually() {
        init_test_logging();
        let mut results = scenario_table_instances();
        results[1].status = ExecutionStatus::Failed;

        let mut spec_result = SpecResult::default();
        spec_result.add_scenario_results(&results);

        assert_eq!(spec_result.scenario_count, 3);
        assert_eq!(spec_result.scenario_failed_count, 1);
        assert!(spec_result.failed_data_table_rows.is_empty());
    }

    #[test]
    fn skips_are_tracked_unless_failed() {
        let mut results = spec_table_instances();
        results[0].status = ExecutionStatus::Skipped;
        results[2].status = ExecutionStatus::Skipped;
        let plain = ScenarioResult::for_scenario(&Scenario::new("Plain", Span::new(12, 14)))
            .with_status(ExecutionStatus::Skipped)
            .with_execution_time(5);
        results.push(plain);

        let mut spec_result = SpecResult::default();
        spec_result.add_scenario_results(&results);

        assert_eq!(spec_result.scenario_count, 2);
        assert_eq!(spec_result.scenario_skipped_count, 3);
        assert_eq!(spec_result.skipped_data_table_rows, vec![0, 2]);
        assert!(!spec_result.is_failed);
        assert_eq!(spec_result.execution_time_ms, 35);
    }

    #[test]
    fn items_render_by_kind() {
        let plain = ScenarioResult::for_scenario(&Scenario::new("Plain", Span::new(1, 2)));
        assert!(matches!(plain.to_item(), ResultItem::Scenario(_)));

        let driven = &spec_table_instances()[2];
        match driven.to_item() {
            ResultItem::TableDrivenScenario(item) => {
                assert!(item.is_spec_table_driven);
                assert_eq!(item.table_row_index, 2);
                assert_eq!(item.scenario.heading, "Driven");
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn hooks_and_items_accumulate() {
        let mut spec_result = SpecResult::default();
        spec_result.add_pre_hook([HookFailure::new("before suite")]);
        spec_result.add_post_hook([HookFailure::new("after suite"), HookFailure::new("again")]);
        spec_result.add_spec_items([ResultItem::Comment("note".into())]);
        spec_result.add_errors(["parse error".to_string()]);
        spec_result.set_skipped(true);

        assert_eq!(spec_result.pre_hook_failures.len(), 1);
        assert_eq!(spec_result.post_hook_failures.len(), 2);
        assert_eq!(spec_result.items, vec![ResultItem::Comment("note".into())]);
        assert_eq!(spec_result.errors, vec!["parse error"]);
        assert!(spec_result.skipped);
    }

    #[test]
    fn suite_join_concatenates_streams() {
        let mut failed = SpecResult::default();
        failed.set_failure();
        failed.add_exec_time(7);
        let mut skipped = SpecResult::default();
        skipped.set_skipped(true);
        skipped.add_exec_time(3);

        let suite = SuiteResult::join(vec![vec![failed], vec![], vec![skipped, SpecResult::default()]]);
        assert_eq!(suite.spec_results.len(), 3);
        assert_eq!(suite.execution_time_ms, 10);
        assert_eq!(suite.specs_failed_count, 1);
        assert_eq!(suite.specs_skipped_count, 1);
        assert!(suite.is_failed);
    }
}
