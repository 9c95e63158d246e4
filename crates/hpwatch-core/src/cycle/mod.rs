//! Fetch cycle coordination.
//!
//! A cycle resolves the roster once, fans out one fetch per member, joins
//! on every result and applies the [`FailurePolicy`](crate::config::FailurePolicy).

pub mod errors;
pub mod handler;
pub mod operations;
pub mod types;

pub use errors::CycleError;
pub use handler::CycleCoordinator;
pub use operations::{collect_rows, sort_rows};
pub use types::{CycleFailure, CycleOutcome, CycleReport, ResultRow, RowStatus, UNAVAILABLE};
