use crate::errors::HpWatchError;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("Character API request for '{seed_id}' failed: {source}")]
    Request {
        seed_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Character API returned HTTP {status} for '{seed_id}'")]
    Status { seed_id: String, status: u16 },

    #[error("Character API response for '{seed_id}' could not be decoded: {message}")]
    Decode { seed_id: String, message: String },
}

impl HpWatchError for RosterError {
    fn error_code(&self) -> &'static str {
        match self {
            RosterError::ClientBuild { .. } => "ROSTER_CLIENT_BUILD_FAILED",
            RosterError::Request { .. } => "ROSTER_REQUEST_FAILED",
            RosterError::Status { .. } => "ROSTER_HTTP_STATUS",
            RosterError::Decode { .. } => "ROSTER_DECODE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        // 403/404 almost always mean a private or mistyped character.
        matches!(self, RosterError::Status { status: 403 | 404, .. })
    }
}
