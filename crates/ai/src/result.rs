use thiserror::Error;

/// Failure of the raw text-completion call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("quota exhausted")]
    Quota,

    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),
}

/// Why free text could not be turned into a draft.
///
/// Every variant is recoverable by the user editing the text and resubmitting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("nothing to extract: input is empty")]
    EmptyInput,

    #[error("extraction backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("extraction backend returned an empty response")]
    EmptyResponse,

    #[error("response is not a JSON object: {0}")]
    MalformedJson(String),

    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ExtractionError {
    /// Message shown inline in the ingestion dialog.
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::EmptyInput => "Describe the item first.".to_string(),
            ExtractionError::Backend(BackendError::Quota) => {
                "The AI service is busy right now. Please try again later.".to_string()
            }
            ExtractionError::Backend(_) => {
                "Could not reach the AI service. Check your connection and try again.".to_string()
            }
            _ => "The AI could not understand that description. Try rephrasing it.".to_string(),
        }
    }
}
