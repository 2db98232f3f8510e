//! Error taxonomy for vault access.
//!
//! Upstream HTTP failures are mapped onto a small set of variants so that
//! callers can branch on the *kind* of failure (missing note, credential
//! problem, upstream outage) without inspecting status codes themselves.

use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Error, Debug)]
pub enum VaultError {
    /// Upstream returned 404 for a read or delete.
    #[error("note not found: {0}")]
    NotFound(String),

    /// Upstream returned 409 — the note already exists.
    #[error("note already exists: {0}")]
    Conflict(String),

    /// Upstream rejected the credential (401). Treated as a configuration
    /// failure, not something a retry can fix.
    #[error("upstream rejected credential: {0}")]
    Auth(String),

    /// Any other 4xx from the upstream plugin.
    #[error("upstream client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// 5xx, transport failure, or timeout. `status` is `None` when the
    /// request never produced a response.
    #[error("upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// Path rejected by the path policy before any I/O.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl VaultError {
    /// Map an upstream HTTP status onto the taxonomy. `subject` names the
    /// path or operation for the error message.
    pub fn from_status(status: u16, subject: &str, body: String) -> Self {
        match status {
            401 => Self::Auth(subject.to_string()),
            404 => Self::NotFound(subject.to_string()),
            409 => Self::Conflict(subject.to_string()),
            400..=499 => Self::Client {
                status,
                message: format!("{subject}: {body}"),
            },
            _ => Self::Upstream {
                status: Some(status),
                message: format!("{subject}: {body}"),
            },
        }
    }

    /// Transport-level failure (connection refused, timeout, bad TLS).
    pub fn transport(subject: &str, cause: impl std::fmt::Display) -> Self {
        Self::Upstream {
            status: None,
            message: format!("{subject}: {cause}"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short machine-readable kind, used in JSON-RPC error `data`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Auth(_) => "auth",
            Self::Client { .. } => "client",
            Self::Upstream { .. } => "upstream",
            Self::InvalidPath(_) => "invalid_path",
        }
    }

    /// The HTTP status carried by the failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Auth(_) => Some(401),
            Self::Client { status, .. } => Some(*status),
            Self::Upstream { status, .. } => *status,
            Self::InvalidPath(_) => None,
        }
    }
}
