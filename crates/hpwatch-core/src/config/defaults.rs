//! Default values for configuration types.

use std::time::Duration;

use crate::config::interval::RefreshInterval;
use crate::config::types::{CycleConfig, Endpoints, FailurePolicy};

/// Character JSON API base.
pub const DEFAULT_API_BASE: &str = "https://character-service.dndbeyond.com/character/v4/character";

/// Public character sheet base.
pub const DEFAULT_PAGE_BASE: &str = "https://www.dndbeyond.com/characters";

/// Refresh once per minute. Polling much faster trips the site's rate limiting.
pub const DEFAULT_INTERVAL: &str = "@every 1m";

/// Intervals below this log a warning.
pub const MIN_RECOMMENDED_INTERVAL: Duration = Duration::from_secs(30);

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

pub fn default_interval() -> RefreshInterval {
    DEFAULT_INTERVAL
        .parse()
        .expect("default interval expression is valid")
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_base: DEFAULT_PAGE_BASE.to_string(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_concurrent: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}
