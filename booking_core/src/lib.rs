#![forbid(unsafe_code)]

//! Core of the booksync booking importer.
//!
//! This crate provides:
//! - Domain types (remote entities, feed rows, row outcomes)
//! - Configuration and logging setup
//! - The scheduling service API seam and its HTTP session
//! - Paginated fetch, entity indices, row reconciliation and booking submission
//! - Import orchestration and the run report

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod api;
pub mod session;
pub mod context;
pub mod fetcher;
pub mod index;
pub mod reconcile;
pub mod submit;
pub mod input;
pub mod report;
pub mod importer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use api::SchedulingApi;
pub use session::HttpSession;
pub use context::{with_run_context, RunContext};
pub use index::EntityIndex;
pub use input::read_rows;
pub use report::{write_rejects, ImportReport, RowRecord};
pub use importer::{plan_import, run_import, PlannedRow};
