//! Error types for jotter.

use std::fmt;

use thiserror::Error;

use crate::models::ItemKind;

/// Result type alias using jotter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed classification of every failure an operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    CircularReference,
    BackendUnavailable,
    Backend,
    UnexpectedResponse,
    Config,
}

/// Why a proposed folder relocation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleViolation {
    /// The folder was proposed as its own parent.
    SelfParent { folder_id: String },
    /// The candidate parent sits below the folder being moved.
    Descendant {
        folder_id: String,
        parent_id: String,
    },
    /// The candidate parent's ancestor chain already loops back on itself.
    ExistingCycle {
        folder_id: String,
        parent_id: String,
        repeated_id: String,
    },
}

impl CycleViolation {
    /// The folder whose relocation was refused.
    pub fn folder_id(&self) -> &str {
        match self {
            Self::SelfParent { folder_id }
            | Self::Descendant { folder_id, .. }
            | Self::ExistingCycle { folder_id, .. } => folder_id,
        }
    }
}

impl fmt::Display for CycleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfParent { folder_id } => {
                write!(f, "folder {} cannot be its own parent", folder_id)
            }
            Self::Descendant {
                folder_id,
                parent_id,
            } => write!(
                f,
                "folder {} is an ancestor of {}; moving it there would create a cycle",
                folder_id, parent_id
            ),
            Self::ExistingCycle {
                folder_id,
                parent_id,
                repeated_id,
            } => write!(
                f,
                "ancestors of {} already form a cycle at {}; refusing to move {} under it",
                parent_id, repeated_id, folder_id
            ),
        }
    }
}

/// Core error type for jotter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input, detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced note or folder is absent in the backend
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: String },

    /// A folder on an ancestor chain does not exist
    #[error("Parent folder not found: {0}")]
    ParentNotFound(String),

    /// Relocation would create, or already sits in, a cycle
    #[error("Circular reference: {0}")]
    CircularReference(CycleViolation),

    /// Backend unreachable or not responding
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend reachable but rejected the request
    #[error("Backend error{}: {message}", status_suffix(.status))]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// Success status with a payload missing required fields
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Shorthand for a missing record.
    pub fn not_found(kind: ItemKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Classify this error into the closed [`ErrorKind`] set.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } | Error::ParentNotFound(_) => ErrorKind::NotFound,
            Error::CircularReference(_) => ErrorKind::CircularReference,
            Error::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            Error::Backend { .. } => ErrorKind::Backend,
            Error::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Name the record a backend failure concerns.
    ///
    /// Transport, rejection and response-shape errors get the record kind
    /// and id prefixed to their message unless the id already appears in it.
    /// Every other variant is returned unchanged.
    pub fn for_record(self, kind: ItemKind, id: &str) -> Self {
        let tag = |message: String| {
            if id.is_empty() || message.contains(id) {
                message
            } else {
                format!("{} {}: {}", kind, id, message)
            }
        };
        match self {
            Error::BackendUnavailable(message) => Error::BackendUnavailable(tag(message)),
            Error::Backend { status, message } => Error::Backend {
                status,
                message: tag(message),
            },
            Error::UnexpectedResponse(message) => Error::UnexpectedResponse(tag(message)),
            other => other,
        }
    }

    /// True when the backend reported the record as missing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::UnexpectedResponse(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // Timeouts are reported like any other rejected request.
        if e.is_connect() {
            Error::BackendUnavailable(e.to_string())
        } else if e.is_decode() {
            Error::UnexpectedResponse(e.to_string())
        } else {
            Error::Backend {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        }
    }
}
