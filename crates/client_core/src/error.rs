use shared::{error::FieldError, schema::SchemaError};
use thiserror::Error;

pub const FALLBACK_ERROR_TEXT: &str = "Please try again later.";

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// Failed local validation; nothing was sent.
    #[error("{0}")]
    Invalid(SchemaError),
    #[error("a submission is already in flight")]
    Busy,
    /// The server refused the payload (4xx).
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        fields: Vec<FieldError>,
    },
    /// The server accepted the request but could not complete it (5xx).
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
}

impl SubmitError {
    /// The most specific text available for showing to the user.
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            FALLBACK_ERROR_TEXT.to_string()
        } else {
            text
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Invalid(schema) => schema.fields(),
            Self::Rejected { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }
}
