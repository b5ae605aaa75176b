use std::{fmt, time::Duration};

use thiserror::Error;

/// Every remote call or user intent the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListFiles,
    Upload,
    Delete,
    Ask,
    ListHistory,
    ClearHistory,
    Refresh,
    Health,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::ListFiles => "list_files",
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::Ask => "ask",
            Self::ListHistory => "list_history",
            Self::ClearHistory => "clear_history",
            Self::Refresh => "refresh",
            Self::Health => "health",
        }
    }

    /// Message shown when a failure carries nothing better from the server.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::ListFiles | Self::Refresh => "Failed to load files",
            Self::Upload => "Failed to upload files",
            Self::Delete => "Failed to delete file",
            Self::Ask => "An error occurred while processing your request",
            Self::ListHistory => "Failed to load history",
            Self::ClearHistory => "Failed to clear history",
            Self::Health => "Service is unreachable",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(
        "service responded with status {status}: {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Service { status: u16, message: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid response from service: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),
    #[error("another operation is already in progress")]
    Busy,
    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        source: ServiceError,
    },
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: Operation,
        after: Duration,
    },
    #[error("{operation} was cancelled")]
    Cancelled { operation: Operation },
}

impl ActionError {
    /// Text recorded in the session `error` field, if this failure shows one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation(message) => Some(message.clone()),
            Self::Busy | Self::Cancelled { .. } => None,
            Self::Remote { operation, source } => Some(
                source
                    .server_message()
                    .unwrap_or(operation.fallback_message())
                    .to_string(),
            ),
            Self::TimedOut { operation, .. } => {
                Some(format!("{} (request timed out)", operation.fallback_message()))
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
