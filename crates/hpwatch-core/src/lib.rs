//! hpwatch-core: Core library for live campaign hit point tracking
//!
//! This library provides the business logic for watching a tabletop
//! campaign's hit points. It is used by the `hpwatch` CLI.
//!
//! # Main Entry Points
//!
//! - [`roster`] - Resolve a seed character into its campaign roster
//! - [`fetch`] - Read one character's hit points from its sheet
//! - [`cycle`] - Fetch a whole roster concurrently and aggregate results
//! - [`schedule`] - Re-run cycles on a fixed interval
//! - [`config`] - Configuration and validation

pub mod config;
pub mod cycle;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod logging;
pub mod roster;
pub mod schedule;

// Re-export commonly used types at crate root for convenience
pub use config::{FailurePolicy, WatchConfig, WatchOptions};
pub use cycle::{CycleCoordinator, CycleFailure, CycleOutcome, CycleReport, ResultRow, RowStatus};
pub use errors::{ConfigError, HpWatchError};
pub use fetch::{BrowserFetcher, Character, HpSource};
pub use roster::{ApiRosterResolver, CampaignInfo, RosterMember, RosterSource};
pub use schedule::Scheduler;

// Re-export logging initialization
pub use logging::init_logging;
