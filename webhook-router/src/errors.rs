use thiserror::Error;

/// Result type alias for router operations
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Transport-level errors of the HTTP service itself. Pipeline failures
/// never surface here; they become `{message, success:false}` bodies.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Response serialization error: {0}")]
    ResponseSerialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One failure per orchestrator stage. The `Display` text is the exact
/// `message` field reported to the caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing request body")]
    MissingInput,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to resolve changes: {0}")]
    Resolve(String),

    #[error("changes job timed out: {0}")]
    Timeout(String),

    #[error("no feature changes found in extraction result")]
    NoChanges,

    #[error("raster catalog query failed: {0}")]
    Query(String),

    #[error("no raster ids found. don't wanna query the entire landsat catalog...")]
    EmptyRasterSet,

    #[error("{0}")]
    Provisioning(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
