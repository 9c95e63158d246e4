use crate::errors::HpWatchError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Browser configuration for '{character_id}' failed: {message}")]
    BrowserConfig {
        character_id: String,
        message: String,
    },

    #[error("Failed to launch browser for '{character_id}': {message}")]
    Launch {
        character_id: String,
        message: String,
    },

    #[error("Failed to emulate device for '{character_id}': {message}")]
    Emulation {
        character_id: String,
        message: String,
    },

    #[error("Failed to load character page for '{character_id}': {message}")]
    Navigation {
        character_id: String,
        message: String,
    },

    #[error("Failed to read hit points for '{character_id}': {message}")]
    Extraction {
        character_id: String,
        message: String,
    },

    #[error("Timed out after {timeout_secs}s fetching '{character_id}'")]
    Timeout {
        character_id: String,
        timeout_secs: u64,
    },

    #[error("Fetch task for '{character_id}' ended without reporting a result")]
    TaskAborted { character_id: String },
}

impl FetchError {
    pub fn character_id(&self) -> &str {
        match self {
            FetchError::BrowserConfig { character_id, .. }
            | FetchError::Launch { character_id, .. }
            | FetchError::Emulation { character_id, .. }
            | FetchError::Navigation { character_id, .. }
            | FetchError::Extraction { character_id, .. }
            | FetchError::Timeout { character_id, .. }
            | FetchError::TaskAborted { character_id } => character_id,
        }
    }
}

impl HpWatchError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::BrowserConfig { .. } => "FETCH_BROWSER_CONFIG",
            FetchError::Launch { .. } => "FETCH_LAUNCH_FAILED",
            FetchError::Emulation { .. } => "FETCH_EMULATION_FAILED",
            FetchError::Navigation { .. } => "FETCH_NAVIGATION_FAILED",
            FetchError::Extraction { .. } => "FETCH_EXTRACTION_FAILED",
            FetchError::Timeout { .. } => "FETCH_TIMEOUT",
            FetchError::TaskAborted { .. } => "FETCH_TASK_ABORTED",
        }
    }

    fn is_user_error(&self) -> bool {
        // No Chrome installed is something only the user can fix.
        matches!(self, FetchError::BrowserConfig { .. })
    }
}
