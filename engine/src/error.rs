use thiserror::Error;

use crate::client::BedrockApiError;

#[derive(Debug, Error)]
pub enum Error {
    /// The model id has no entry in the adapter table
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Response from {model_id} is not JSON: {source}")]
    InvalidJson {
        model_id: String,
        source: serde_json::Error,
    },

    /// The response is JSON but lacks the image data
    #[error("Malformed response from {model_id}: {reason}")]
    MalformedResponse { model_id: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    pub(crate) fn malformed(model_id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            model_id: model_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of the network call itself, passed through to the caller unchanged
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Service(#[from] BedrockApiError),

    #[error("Invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
