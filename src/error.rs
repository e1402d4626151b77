//! Error types for the Book Club console

use thiserror::Error;
use validator::ValidationErrors;

/// How an error should be presented to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blocked before any collaborator call; scoped to a form field
    Validation,
    /// A collaborator refused the request or could not be reached
    Rejection,
    /// A collaborator answered with something we could not interpret
    DataShape,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("Missing contact: no e-mail address for {0}")]
    MissingContact(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    DataShape(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_)
            | AppError::InvalidField { .. }
            | AppError::MissingContact(_)
            | AppError::BusinessRule(_) => ErrorKind::Validation,
            AppError::DataShape(_) => ErrorKind::DataShape,
            AppError::Authentication(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_)
            | AppError::Rejected { .. }
            | AppError::Transport(_)
            | AppError::Email(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorKind::Rejection,
        }
    }

    /// Field the error is attached to, for validation errors
    pub fn field(&self) -> Option<String> {
        match self {
            AppError::InvalidField { field, .. } => Some((*field).to_string()),
            AppError::Validation(errors) => first_field_error(errors).map(|(field, _)| field),
            _ => None,
        }
    }

    /// Short text suitable for a transient notice
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(errors) => first_field_error(errors)
                .map(|(_, message)| message)
                .unwrap_or_else(|| "Invalid input".to_string()),
            AppError::InvalidField { message, .. } => message.clone(),
            AppError::MissingContact(name) => format!("Missing email for {}", name),
            AppError::BusinessRule(msg)
            | AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Rejected { message, .. } => message.clone(),
            AppError::Transport(_) => "The library service could not be reached".to_string(),
            AppError::DataShape(_) => "Unexpected data received from the library service".to_string(),
            AppError::Email(_) => "Failed to send email".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

/// First failing field in name order, with its message
fn first_field_error(errors: &ValidationErrors) -> Option<(String, String)> {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect();
    fields.sort();
    fields.into_iter().next()
}

/// Result type alias for console operations
pub type AppResult<T> = Result<T, AppError>;
