use crate::errors::HpWatchError;
use crate::fetch::FetchError;
use crate::roster::RosterError;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Roster resolution failed: {source}")]
    Resolve {
        #[from]
        source: RosterError,
    },

    #[error("Fetching character '{character_id}' failed: {source}")]
    Fetch {
        character_id: String,
        #[source]
        source: FetchError,
    },
}

impl From<FetchError> for CycleError {
    fn from(source: FetchError) -> Self {
        CycleError::Fetch {
            character_id: source.character_id().to_string(),
            source,
        }
    }
}

impl HpWatchError for CycleError {
    fn error_code(&self) -> &'static str {
        match self {
            CycleError::Resolve { source } => source.error_code(),
            CycleError::Fetch { source, .. } => source.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            CycleError::Resolve { source } => source.is_user_error(),
            CycleError::Fetch { source, .. } => source.is_user_error(),
        }
    }
}
