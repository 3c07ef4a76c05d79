use opentelemetry_http::HttpError;
use thiserror::Error;

/// Errors reported through the `on_error` continuation of a send
#[derive(Error, Debug)]
pub enum OtlpExporterError {
    /// The collector answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The injected transport failed before producing a response
    #[error("Transport error: {0}")]
    Transport(#[source] HttpError),

    #[error("Failed to encode export request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to compress export request: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Failed to build export request: {0}")]
    Request(#[from] http::Error),

    /// No URL could be resolved from configuration or environment
    #[error("No export endpoint configured")]
    MissingEndpoint,
}

impl OtlpExporterError {
    pub(crate) fn from_status(status: http::StatusCode) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: format!(
                "HTTP Error: {}",
                status.canonical_reason().unwrap_or("Unknown Status")
            ),
        }
    }

    /// Returns the HTTP status carried by an [`OtlpExporterError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
