use std::error::Error;

/// Base trait for all application errors
pub trait HpWatchError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Invalid interval '{expr}': {reason}. Use '@every <duration>', a cron expression or a descriptor, e.g. '@every 1m', '*/5 * * * *' or '@hourly'"
    )]
    InvalidInterval { expr: String, reason: String },

    #[error("No character ID given. Pass it as an argument or enter it at the prompt")]
    MissingSeedId,

    #[error("Invalid character ID '{id}': must be numeric")]
    InvalidSeedId { id: String },

    #[error("Invalid timeout: must be at least one second")]
    InvalidTimeout,

    #[error("Invalid concurrency limit: must be at least 1")]
    InvalidConcurrency,

    #[error("Invalid URL '{url}': must be an http:// or https:// URL with a host")]
    InvalidUrl { url: String },

    #[error("IO error reading input: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl HpWatchError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidInterval { .. } => "INVALID_INTERVAL",
            ConfigError::MissingSeedId => "MISSING_SEED_ID",
            ConfigError::InvalidSeedId { .. } => "INVALID_SEED_ID",
            ConfigError::InvalidTimeout => "INVALID_TIMEOUT",
            ConfigError::InvalidConcurrency => "INVALID_CONCURRENCY",
            ConfigError::InvalidUrl { .. } => "INVALID_URL",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        !matches!(self, ConfigError::IoError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_seed_display() {
        let error = ConfigError::InvalidSeedId {
            id: "abc".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid character ID 'abc': must be numeric");
        assert_eq!(error.error_code(), "INVALID_SEED_ID");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_invalid_interval_display() {
        let error = ConfigError::InvalidInterval {
            expr: "every minute".to_string(),
            reason: "unknown unit".to_string(),
        };
        assert!(error.to_string().starts_with("Invalid interval 'every minute'"));
        assert_eq!(error.error_code(), "INVALID_INTERVAL");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_io_error_is_not_user_error() {
        let error = ConfigError::from(std::io::Error::other("closed"));
        assert_eq!(error.error_code(), "CONFIG_IO_ERROR");
        assert!(!error.is_user_error());
    }
}
