use actix_web::http::StatusCode;

/// Error taxonomy for the analysis pipeline.
///
/// `InvalidUrl` is the only variant surfaced synchronously to the caller;
/// everything else is captured into job state and read back via polling.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("External service unavailable: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Status code used when an error is returned directly from a route
    /// instead of being parked on a job.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidUrl(_) | AnalysisError::Fetch(_) => StatusCode::BAD_REQUEST,
            AnalysisError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
