use thiserror::Error;

use crate::http::HttpError;

/// Why a modal flow attempt failed. `Display` is the text shown in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Rejected before any request was made.
    #[error("{0}")]
    Validation(String),
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// No response at all (connection refused, DNS, aborted body, ...).
    #[error("{0}")]
    Transport(String),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Validation(_) | Self::Transport(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<HttpError> for FlowError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.message)
    }
}

/// Status of the latest attempt of one flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(FlowError),
}

impl FlowStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&FlowError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
