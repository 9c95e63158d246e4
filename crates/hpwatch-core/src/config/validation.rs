//! Configuration validation.
//!
//! Every check runs at startup so a bad flag is reported before the first
//! cycle touches the network.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::config::defaults::{self, MIN_RECOMMENDED_INTERVAL};
use crate::config::interval::RefreshInterval;
use crate::config::types::{CycleConfig, Endpoints, FailurePolicy, WatchConfig, WatchOptions};
use crate::errors::ConfigError;

/// Validate a seed character id and return it in canonical form.
///
/// Leading zeros are dropped so the id matches the `characterId` values the
/// API lists for campaign members.
pub fn validate_seed_id(raw: &str) -> Result<String, ConfigError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ConfigError::MissingSeedId);
    }
    let invalid = || ConfigError::InvalidSeedId { id: id.to_string() };
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u64 = id.parse().map_err(|_| invalid())?;
    Ok(value.to_string())
}

/// Validate an endpoint base URL, stripping any trailing slashes.
///
/// The base must parse as an `http` or `https` URL with a host and no
/// query or fragment, since character ids are appended as a path segment.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        url: raw.to_string(),
    };

    let url = raw.trim().parse::<Url>().map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid());
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Turn raw CLI options into a validated [`WatchConfig`].
pub fn validate_options(options: WatchOptions) -> Result<WatchConfig, ConfigError> {
    let seed_id = validate_seed_id(&options.seed_id)?;

    let interval = match options.interval.as_deref() {
        Some(expr) => expr.parse::<RefreshInterval>()?,
        None => defaults::default_interval(),
    };
    if interval
        .period()
        .is_some_and(|period| period < MIN_RECOMMENDED_INTERVAL)
    {
        warn!(
            event = "core.config.interval_below_recommended",
            interval = %interval,
            recommended_secs = MIN_RECOMMENDED_INTERVAL.as_secs(),
            "Short refresh intervals may be rate limited by the character site"
        );
    }

    let timeout_secs = options
        .timeout_secs
        .unwrap_or(defaults::DEFAULT_FETCH_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidTimeout);
    }

    if options.max_concurrent == Some(0) {
        return Err(ConfigError::InvalidConcurrency);
    }

    let endpoints = Endpoints {
        api_base: match options.api_base.as_deref() {
            Some(url) => normalize_base_url(url)?,
            None => defaults::DEFAULT_API_BASE.to_string(),
        },
        page_base: match options.page_base.as_deref() {
            Some(url) => normalize_base_url(url)?,
            None => defaults::DEFAULT_PAGE_BASE.to_string(),
        },
    };

    let failure_policy = if options.strict {
        FailurePolicy::Strict
    } else {
        FailurePolicy::Partial
    };

    Ok(WatchConfig {
        seed_id,
        interval,
        cycle: CycleConfig {
            fetch_timeout: Duration::from_secs(timeout_secs),
            max_concurrent: options.max_concurrent,
            failure_policy,
        },
        exit_on_error: options.exit_on_error,
        endpoints,
    })
}
