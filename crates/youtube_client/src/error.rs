use domain::ServiceError;

/// Failure of a single upstream call
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("YouTube API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse {resource} response: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed YouTube API response: {0}")]
    Malformed(String),
}

// Transport, quota and payload problems all surface the same way to callers
impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}
