use serde_json::Value;
use thiserror::Error;

/// Errors returned by the Bedrock runtime service
#[derive(Debug, Error)]
pub enum BedrockApiError {
    #[error("Validation error (400): {message}")]
    Validation { message: String },

    #[error("Access denied (403): {message}")]
    AccessDenied { message: String },

    #[error("Resource not found (404): {message}")]
    ResourceNotFound { message: String },

    #[error("Service quota exceeded (400): {message}")]
    ServiceQuotaExceeded { message: String },

    #[error("Model timeout (408): {message}")]
    ModelTimeout { message: String },

    #[error("Model error (424): {message}")]
    ModelError { message: String },

    #[error("Throttled (429): {message}")]
    Throttling { message: String },

    #[error("Model not ready (429): {message}")]
    ModelNotReady { message: String },

    #[error("Internal server error (500): {message}")]
    InternalServer { message: String },

    #[error("Service unavailable (503): {message}")]
    ServiceUnavailable { message: String },

    /// Catch-all for unknown error types and status codes
    #[error("Unexpected API error ({error_type}): {message}")]
    Unexpected { error_type: String, message: String },
}

impl BedrockApiError {
    pub fn from_type(error_type: &str, message: impl Into<String>) -> Self {
        let message = message.into();

        match error_type {
            "ValidationException" => Self::Validation { message },
            "AccessDeniedException" | "UnrecognizedClientException" => {
                Self::AccessDenied { message }
            }
            "ResourceNotFoundException" => Self::ResourceNotFound { message },
            "ServiceQuotaExceededException" => Self::ServiceQuotaExceeded { message },
            "ModelTimeoutException" => Self::ModelTimeout { message },
            "ModelErrorException" => Self::ModelError { message },
            "ThrottlingException" => Self::Throttling { message },
            "ModelNotReadyException" => Self::ModelNotReady { message },
            "InternalServerException" => Self::InternalServer { message },
            "ServiceUnavailableException" => Self::ServiceUnavailable { message },
            other => Self::Unexpected {
                error_type: other.to_string(),
                message,
            },
        }
    }

    /// Classifies a non-success response.
    ///
    /// The error type comes from the `x-amzn-ErrorType` header if present, then from the
    /// `__type` field of the body, and falls back to the status code.
    pub fn from_response(status: u16, error_type_header: Option<&str>, body: &[u8]) -> Self {
        let json = serde_json::from_slice::<Value>(body).ok();

        let message = json
            .as_ref()
            .and_then(|j| j.get("message").or_else(|| j.get("Message")))
            .and_then(Value::as_str)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        let error_type = error_type_header
            .and_then(|h| h.split(':').next())
            .or_else(|| {
                json.as_ref()
                    .and_then(|j| j.get("__type"))
                    .and_then(Value::as_str)
                    .and_then(|t| t.rsplit('#').next())
            })
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match error_type {
            Some(t) => Self::from_type(t, message),
            None => Self::from_status(status, message),
        }
    }

    fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::Validation { message },
            401 | 403 => Self::AccessDenied { message },
            404 => Self::ResourceNotFound { message },
            408 => Self::ModelTimeout { message },
            424 => Self::ModelError { message },
            429 => Self::Throttling { message },
            500 => Self::InternalServer { message },
            503 => Self::ServiceUnavailable { message },
            other => Self::Unexpected {
                error_type: format!("HTTP {other}"),
                message,
            },
        }
    }
}
