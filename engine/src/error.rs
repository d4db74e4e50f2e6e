use thiserror::Error;

/// Everything that can go wrong between pressing "Generate" and seeing a result.
///
/// The `Display` output is what ends up in the error banner, so it is written for
/// the user, not for a log file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Please upload an image and enter a prompt.")]
    Validation,

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Could not extract base64 string from file data URL.")]
    Format,

    /// The remote call itself failed: network, auth, quota, malformed request
    #[error("Failed to edit image: {0}")]
    Service(String),

    /// The call went through but no part carried inline image data
    #[error(
        "No image data was found in the Gemini API response. The model may not have been able to fulfill the request."
    )]
    NoImageProduced,
}

impl EditError {
    pub fn service(diagnostic: impl ToString) -> Self {
        Self::Service(diagnostic.to_string())
    }
}

impl From<reqwest::Error> for EditError {
    fn from(e: reqwest::Error) -> Self {
        Self::service(e)
    }
}
