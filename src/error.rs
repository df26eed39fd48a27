use reqwest::StatusCode;

use crate::models::FormKind;

/// Wizard-level errors
///
/// Every controller operation surfaces its error in the view before returning it,
/// so none of these are fatal to the wizard.
#[derive(thiserror::Error, Debug)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ServerReported(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Invalid data format: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("A {0} submission is already in progress")]
    Busy(FormKind),

    #[error("Rental duration of {0} days is not offered")]
    InvalidDuration(u32),

    #[error("Car {0} is not among the current recommendations")]
    UnknownCar(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error taxonomy the view layer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected client-side, no request was sent
    Validation,
    /// The payload carried an `error` field
    ServerReported,
    /// Network failure, bad status or unparsable body
    Transport,
    /// Misuse of the controller (duplicate submission, bad booking input)
    Usage,
}

impl WizardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WizardError::Validation(_) => ErrorCategory::Validation,
            WizardError::ServerReported(_) => ErrorCategory::ServerReported,
            WizardError::Http(_)
            | WizardError::UnexpectedStatus { .. }
            | WizardError::Decode(_) => ErrorCategory::Transport,
            WizardError::Busy(_)
            | WizardError::InvalidDuration(_)
            | WizardError::UnknownCar(_)
            | WizardError::Session(_)
            | WizardError::Io(_) => ErrorCategory::Usage,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
