//! Configuration type definitions for hpwatch.
//!
//! Everything here is assembled from command-line arguments; there are no
//! config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::interval::RefreshInterval;

/// What a cycle does when some characters could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Any failed fetch fails the whole cycle and no rows are produced.
    Strict,
    /// Failed fetches become "unavailable" rows; the rest still render.
    #[default]
    Partial,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Strict => f.write_str("strict"),
            FailurePolicy::Partial => f.write_str("partial"),
        }
    }
}

/// Endpoints the watcher talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base of the character JSON API; the seed id is appended as a path segment.
    pub api_base: String,
    /// Base of the public character page; the character id is appended.
    pub page_base: String,
}

impl Endpoints {
    pub fn character_api_url(&self, id: &str) -> String {
        format!("{}/{}", self.api_base, id)
    }

    pub fn character_page_url(&self, id: &str) -> String {
        format!("{}/{}", self.page_base, id)
    }
}

/// Settings for a fetch cycle, shared by every cycle the scheduler starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleConfig {
    /// Upper bound for one character's browser fetch.
    pub fetch_timeout: Duration,
    /// Cap on concurrent browser sessions; `None` is unbounded.
    pub max_concurrent: Option<usize>,
    pub failure_policy: FailurePolicy,
}

/// Raw, unvalidated settings as the CLI collected them.
///
/// Turned into a [`WatchConfig`] by [`crate::config::validate_options`].
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub seed_id: String,
    /// Interval expression; `None` uses the default.
    pub interval: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_concurrent: Option<usize>,
    pub strict: bool,
    pub exit_on_error: bool,
    pub api_base: Option<String>,
    pub page_base: Option<String>,
}

/// Fully validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// The character the campaign roster is discovered from.
    pub seed_id: String,
    pub interval: RefreshInterval,
    pub cycle: CycleConfig,
    /// Stop the watcher on the first failed cycle instead of retrying next tick.
    pub exit_on_error: bool,
    pub endpoints: Endpoints,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let endpoints = Endpoints {
            api_base: "https://api.example.com/character".to_string(),
            page_base: "https://www.example.com/characters".to_string(),
        };
        assert_eq!(
            endpoints.character_api_url("100"),
            "https://api.example.com/character/100"
        );
        assert_eq!(
            endpoints.character_page_url("200"),
            "https://www.example.com/characters/200"
        );
    }

    #[test]
    fn test_failure_policy_serialization() {
        let json = serde_json::to_string(&FailurePolicy::Strict).unwrap();
        assert_eq!(json, "\"strict\"");
        let parsed: FailurePolicy = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Partial);
        assert_eq!(FailurePolicy::default(), FailurePolicy::Partial);
        assert_eq!(FailurePolicy::Strict.to_string(), "strict");
    }
}
