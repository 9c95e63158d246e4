//! # Configuration
//!
//! hpwatch is configured entirely from the command line. The CLI collects
//! raw [`WatchOptions`], and [`validate_options`] turns them into a
//! [`WatchConfig`] before any cycle runs, so a bad interval or id is a
//! startup error rather than a failure on the first tick.
//!
//! ```rust
//! use hpwatch_core::config::{WatchOptions, validate_options};
//!
//! let config = validate_options(WatchOptions {
//!     seed_id: "12345".to_string(),
//!     interval: Some("@every 2m".to_string()),
//!     ..Default::default()
//! })
//! .unwrap();
//! assert_eq!(config.interval.period(), Some(std::time::Duration::from_secs(120)));
//! ```

pub mod defaults;
pub mod interval;
pub mod types;
pub mod validation;

pub use interval::{Cadence, RefreshInterval};
pub use types::{CycleConfig, Endpoints, FailurePolicy, WatchConfig, WatchOptions};
pub use validation::{normalize_base_url, validate_options, validate_seed_id};
