//! Scenario selection, stream distribution and result aggregation for
//! spec-driven test harnesses.
//!
//! Parsed specifications go through [`select::Selection`], which applies
//! line, tag, name and group filters, then [`distribute`] splits the result
//! across execution streams. After execution, [`result::SpecResult`] folds
//! scenario outcomes into per-specification summaries.

pub mod cli;
pub mod config;
pub mod distribute;
pub mod error;
pub mod filter;
pub mod logging;
pub mod model;
pub mod result;
pub mod select;
pub mod tags;

pub use error::{ErrorCode, Result, SelectError, StructuredError};
