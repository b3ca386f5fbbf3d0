use thiserror::Error;

/// Errors returned by the advisory API client.
#[derive(Debug, Error)]
pub enum AdviceError {
    /// The request did not complete within the configured deadline.
    #[error("advice request timed out")]
    Timeout,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The advisory API answered with an error envelope or status.
    #[error("advice API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for AdviceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdviceError::Timeout
        } else {
            AdviceError::Http(err)
        }
    }
}
