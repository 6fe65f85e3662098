use thiserror::Error;

/// Failure of a single lookup service. The chain logs these and moves on;
/// they never reach the caller of `ResolverChain::resolve`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Request to '{service}' failed: {source}")]
    Http {
        service: String,
        source: reqwest::Error,
    },

    #[error("'{service}' answered HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("Unexpected response from '{service}': {message}")]
    Malformed { service: String, message: String },

    #[error("Invalid base URL for '{service}': {url}")]
    BaseUrl { service: String, url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl LookupError {
    pub(crate) fn http(service: &str, source: reqwest::Error) -> Self {
        Self::Http {
            service: service.into(),
            source,
        }
    }

    pub(crate) fn malformed(service: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            service: service.into(),
            message: message.into(),
        }
    }
}
