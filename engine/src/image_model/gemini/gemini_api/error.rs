use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Gemini API, keyed on the `status` of its error envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeminiApiError {
    #[error("Invalid argument (400): {message}")]
    InvalidArgument { message: String },

    #[error("Authentication error (401): {message}")]
    Unauthenticated { message: String },

    #[error("Permission denied (403): {message}")]
    PermissionDenied { message: String },

    #[error("Not found (404): {message}")]
    NotFound { message: String },

    #[error("Quota exhausted (429): {message}")]
    ResourceExhausted { message: String },

    #[error("Internal API error (500): {message}")]
    Internal { message: String },

    #[error("Service unavailable (503): {message}")]
    Unavailable { message: String },

    /// Catch-all for statuses not listed above, or bodies that aren't an envelope
    #[error("Unexpected API error ({code}): {message}")]
    Unexpected { code: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    error: EnvelopeBody,
}

#[derive(Debug, Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiApiError {
    pub fn from_status(status: &str, code: u16, message: impl Into<String>) -> Self {
        let message = message.into();

        match status {
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => Self::InvalidArgument { message },
            "UNAUTHENTICATED" => Self::Unauthenticated { message },
            "PERMISSION_DENIED" => Self::PermissionDenied { message },
            "NOT_FOUND" => Self::NotFound { message },
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted { message },
            "INTERNAL" => Self::Internal { message },
            "UNAVAILABLE" => Self::Unavailable { message },
            _ => Self::Unexpected { code, message },
        }
    }

    /// Builds the error from a non-2xx response body
    pub fn from_response(code: u16, body: &str) -> Self {
        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope { error }) => Self::from_status(&error.status, code, error.message),
            Err(_) => Self::Unexpected {
                code,
                message: body.trim().to_string(),
            },
        }
    }
}
