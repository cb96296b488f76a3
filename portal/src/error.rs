use thiserror::Error;

/// Result type alias for portal operations
pub type Result<T, E = PortalError> = std::result::Result<T, E>;

/// Errors that can occur while talking to the platform
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("missing either x or y param")]
    MissingCoordinate,

    #[error("coordinates must be finite numbers")]
    InvalidCoordinate,

    #[error("invalid changes url: {0}")]
    InvalidChangesUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected {context} payload: {detail}")]
    MalformedResponse {
        context: &'static str,
        detail: String,
    },

    #[error("changes job did not complete after {attempts} polls")]
    JobTimeout { attempts: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("item creation rejected: {0}")]
    ItemRejected(String),
}

impl PortalError {
    pub(crate) fn malformed(context: &'static str, detail: impl Into<String>) -> Self {
        PortalError::MalformedResponse {
            context,
            detail: detail.into(),
        }
    }
}
