//! Core data types for `scenario_select`.
//!
//! This module defines the entities handed over by the specification parser:
//! - `Specification` - One parsed specification document
//! - `Item` - The closed set of things a specification body can contain
//! - `Scenario` - A named unit of behavior, possibly one data-table row of it
//! - `Table` / `TableCell` - Data tables and their cells
//! - `SpecCollection` - The specifications assigned to one execution stream

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header of the table column whose cells carry per-row tags.
pub const TAGS_COLUMN: &str = "tags";

/// Inclusive line span of a scenario in its source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `line` falls within `[start, end]`.
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Tag groups in declaration order.
///
/// Each group is one tag line of the source; the order of names inside a
/// group carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Tags {
    pub groups: Vec<Vec<String>>,
}

impl Tags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tags from a single group.
    #[must_use]
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = Self::new();
        tags.add(values);
        tags
    }

    /// Append a group of tag names.
    pub fn add<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .push(values.into_iter().map(Into::into).collect());
    }

    /// All tag names across every group, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

/// Split a comma-separated tag list and trim each name.
#[must_use]
pub fn split_and_trim_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}

/// How a table cell's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    #[default]
    Static,
    Dynamic,
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TableCell {
    pub value: String,
    #[serde(default)]
    pub cell_type: CellType,
}

impl TableCell {
    #[must_use]
    pub fn new(value: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            value: value.into(),
            cell_type,
        }
    }

    /// A static cell, the common case.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value, CellType::Static)
    }
}

/// A data table: named columns and rows of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<TableCell>>,
    #[serde(default)]
    pub line: usize,
}

impl Table {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<TableCell>>, line: usize) -> Self {
        Self {
            headers,
            rows,
            line,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Index of the column whose header equals `header`, ignoring case.
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(header))
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[TableCell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Copy of this table holding only row `index`.
    #[must_use]
    pub fn materialize_row(&self, index: usize) -> Option<Self> {
        self.rows.get(index).map(|row| Self {
            headers: self.headers.clone(),
            rows: vec![row.clone()],
            line: self.line,
        })
    }

    /// Tags listed in the `tags` column of row `index`, if the table has one.
    #[must_use]
    pub fn row_tags(&self, index: usize) -> Vec<String> {
        let Some(column) = self.column_index(TAGS_COLUMN) else {
            return Vec::new();
        };
        self.row(index)
            .and_then(|row| row.get(column))
            .map(|cell| {
                split_and_trim_tags(&cell.value)
                    .into_iter()
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Row tags of every row, in row order.
    #[must_use]
    pub fn all_row_tags(&self) -> Vec<String> {
        (0..self.row_count()).flat_map(|i| self.row_tags(i)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    pub value: String,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    pub text: String,
    #[serde(default)]
    pub line: usize,
}

/// A scenario, or one data-table row instance of it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Scenario {
    pub heading: String,
    pub span: Span,
    #[serde(default)]
    pub tags: Tags,
    /// Tag expression inherited by this scenario, evaluated alongside any
    /// run-level expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// The single spec-level table row this instance runs with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_data_table_row: Option<Table>,
    /// The single scenario-level table row this instance runs with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_data_table_row: Option<Table>,
    #[serde(default)]
    pub spec_data_table_row_index: usize,
    #[serde(default)]
    pub scenario_data_table_row_index: usize,
}

impl Scenario {
    #[must_use]
    pub fn new(heading: impl Into<String>, span: Span) -> Self {
        Self {
            heading: heading.into(),
            span,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.add(tags);
        self
    }

    #[must_use]
    pub fn with_filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn with_spec_row(mut self, row: Table) -> Self {
        self.spec_data_table_row = Some(row);
        self
    }

    #[must_use]
    pub fn with_scenario_row(mut self, row: Table) -> Self {
        self.scenario_data_table_row = Some(row);
        self
    }

    #[must_use]
    pub const fn in_span(&self, line: usize) -> bool {
        self.span.contains(line)
    }

    #[must_use]
    pub fn has_any_heading(&self, headings: &[String]) -> bool {
        headings.iter().any(|heading| heading == &self.heading)
    }

    #[must_use]
    pub const fn is_spec_table_driven(&self) -> bool {
        self.spec_data_table_row.is_some()
    }

    #[must_use]
    pub const fn is_scenario_table_driven(&self) -> bool {
        self.scenario_data_table_row.is_some()
    }

    /// Tags carried by the materialized data-table rows of this instance.
    #[must_use]
    pub fn row_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(row) = &self.spec_data_table_row {
            tags.extend(row.all_row_tags());
        }
        if let Some(row) = &self.scenario_data_table_row {
            tags.extend(row.all_row_tags());
        }
        tags
    }
}

/// Everything a specification body can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Item {
    Scenario(Scenario),
    Step(Step),
    Comment(Comment),
    Table(Table),
    Tags(Tags),
    TearDown(Step),
}

impl Item {
    #[must_use]
    pub const fn as_scenario(&self) -> Option<&Scenario> {
        match self {
            Self::Scenario(scenario) => Some(scenario),
            Self::Step(_) | Self::Comment(_) | Self::Table(_) | Self::Tags(_) | Self::TearDown(_) => {
                None
            }
        }
    }

    #[must_use]
    pub const fn is_scenario(&self) -> bool {
        matches!(self, Self::Scenario(_))
    }
}

/// A parsed specification.
///
/// Scenarios live inside `items`, so the ordered scenario list is always the
/// subsequence of scenario items and the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Specification {
    pub heading: String,
    /// File identity; also the identity of the spec-level data table.
    pub file_name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// The spec-level data table (one row per expanded instance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_table: Option<Table>,
}

impl Specification {
    #[must_use]
    pub fn new(heading: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_scenario(self, scenario: Scenario) -> Self {
        self.with_item(Item::Scenario(scenario))
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.add(tags);
        self
    }

    #[must_use]
    pub fn with_filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn with_data_table(mut self, table: Table) -> Self {
        self.data_table = Some(table);
        self
    }

    /// Scenarios in item order.
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.items.iter().filter_map(Item::as_scenario)
    }

    pub fn scenarios_mut(&mut self) -> impl Iterator<Item = &mut Scenario> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios().count()
    }

    #[must_use]
    pub fn has_scenarios(&self) -> bool {
        self.items.iter().any(Item::is_scenario)
    }

    /// Copy of this specification with no items, used as the base of each
    /// half when the items are split.
    #[must_use]
    pub fn without_items(&self) -> Self {
        Self {
            heading: self.heading.clone(),
            file_name: self.file_name.clone(),
            items: Vec::new(),
            tags: self.tags.clone(),
            filter_expression: self.filter_expression.clone(),
            data_table: self.data_table.clone(),
        }
    }
}

/// The specifications assigned to one execution stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SpecCollection {
    specs: Vec<Specification>,
}

impl SpecCollection {
    #[must_use]
    pub fn new(specs: Vec<Specification>) -> Self {
        Self { specs }
    }

    pub fn add(&mut self, spec: Specification) {
        self.specs.push(spec);
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
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_table() -> Table {
        Table::new(
            vec!["app".to_string(), "Tags".to_string()],
            vec![
                vec![TableCell::text("app1"), TableCell::text("tag1, tag2")],
                vec![TableCell::text("app2"), TableCell::text("tag3,, tag4 ")],
            ],
            3,
        )
    }

    #[test]
    fn span_contains_is_inclusive() {
        let span = Span::new(4, 6);
        assert!(!span.contains(3));
        assert!(span.contains(4));
        assert!(span.contains(6));
        assert!(!span.contains(7));
    }

    #[test]
    fn tags_flatten_groups_in_order() {
        let mut tags = Tags::from_values(["a", "b"]);
        tags.add(["c"]);
        assert_eq!(tags.values().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(!tags.is_empty());
        assert!(Tags::new().is_empty());
    }

    #[test]
    fn split_and_trim_tags_keeps_positions() {
        assert_eq!(split_and_trim_tags(" a , b c,d"), vec!["a", "b c", "d"]);
    }

    #[test]
    fn table_row_tags_use_tags_column_case_insensitively() {
        let table = tagged_table();
        assert_eq!(table.row_tags(0), vec!["tag1", "tag2"]);
        assert_eq!(table.row_tags(1), vec!["tag3", "tag4"]);
        assert!(table.row_tags(2).is_empty());

        let row = table.materialize_row(1).expect("row 1");
        assert_eq!(row.row_count(), 1);
        assert_eq!(row.all_row_tags(), vec!["tag3", "tag4"]);
    }

    #[test]
    fn table_without_tags_column_has_no_row_tags() {
        let table = Table::new(
            vec!["app".to_string()],
            vec![vec![TableCell::text("tag1")]],
            1,
        );
        assert!(table.row_tags(0).is_empty());
    }

    #[test]
    fn scenario_row_tags_merge_both_tables() {
        let table = tagged_table();
        let scenario = Scenario::new("s", Span::new(1, 2))
            .with_spec_row(table.materialize_row(0).expect("row"))
            .with_scenario_row(table.materialize_row(1).expect("row"));
        assert!(scenario.is_spec_table_driven());
        assert!(scenario.is_scenario_table_driven());
        assert_eq!(scenario.row_tags(), vec!["tag1", "tag2", "tag3", "tag4"]);
    }

    #[test]
    fn specification_scenarios_follow_item_order() {
        let spec = Specification::new("Spec", "a.spec")
            .with_item(Item::Comment(Comment {
                value: "intro".to_string(),
                line: 1,
            }))
            .with_scenario(Scenario::new("one", Span::new(2, 4)))
            .with_item(Item::Table(Table::default()))
            .with_scenario(Scenario::new("two", Span::new(5, 8)));

        let headings: Vec<&str> = spec.scenarios().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["one", "two"]);
        assert_eq!(spec.scenario_count(), 2);
        assert!(spec.without_items().items.is_empty());
    }

    #[test]
    fn item_json_uses_kind_tag() {
        let item = Item::Tags(Tags::from_values(["smoke"]));
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["kind"], "tags");
        assert_eq!(json["value"][0][0], "smoke");

        let back: Item = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, item);
    }
}
