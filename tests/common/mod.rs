#![allow(dead_code)]

use scenario_select::model::{Scenario, Span, Specification, Table, TableCell};
use std::sync::Once;
use std::time::Instant;
use tracing::info;

pub mod cli;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        scenario_select::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}

/// A small suite: `count` specs, each with a smoke-tagged and a
/// slow-tagged scenario.
pub fn sample_suite(count: usize) -> Vec<Specification> {
    (0..count)
        .map(|i| {
            Specification::new(format!("Spec {i}"), format!("specs/spec{i}.spec"))
                .with_tags(["suite"])
                .with_scenario(Scenario::new(format!("Login {i}"), Span::new(3, 6)).with_tags(["smoke"]))
                .with_scenario(
                    Scenario::new(format!("Checkout {i}"), Span::new(8, 12)).with_tags(["slow"]),
                )
        })
        .collect()
}

/// One spec instance per row of a tagged spec-level data table.
pub fn spec_table_suite() -> Vec<Specification> {
    let table = Table::new(
        vec!["user".into(), "tags".into()],
        vec![
            vec![TableCell::text("alice"), TableCell::text("admin")],
            vec![TableCell::text("bob"), TableCell::text("guest")],
            vec![TableCell::text("carol"), TableCell::text("admin, beta")],
        ],
        1,
    );
    (0..table.row_count())
        .filter_map(|row| {
            let materialized = table.materialize_row(row)?;
            let mut scenario = Scenario::new("Sign in", Span::new(5, 9)).with_spec_row(materialized);
            scenario.spec_data_table_row_index = row;
            Some(
                Specification::new("Accounts", "specs/accounts.spec")
                    .with_data_table(table.clone())
                    .with_scenario(scenario),
            )
        })
        .collect()
}
