// ABOUTME: Transport-level error types.
// ABOUTME: Classifies failures as network, authentication, invalid input or other.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("connection to {0} timed out")]
    ConnectTimeout(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("host key for {0} was rejected")]
    HostKeyRejected(String),

    #[error("SSH agent not available: {0}")]
    AgentUnavailable(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("command timed out after {0:?}")]
    CommandTimeout(std::time::Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Key(#[from] russh::keys::Error),

    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection-level failure; the same request may succeed on a new session.
    Network,
    /// Credentials or handshake rejected.
    Authentication,
    /// A local or remote path the transport cannot use.
    InvalidInput,
    /// Anything else (command timeout, SFTP status errors).
    Other,
}

impl TransportError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Connection(_)
            | TransportError::ConnectTimeout(_)
            | TransportError::CommandFailed(_)
            | TransportError::ChannelClosed
            | TransportError::Protocol(_)
            | TransportError::Io(_) => TransportErrorKind::Network,
            TransportError::AuthenticationFailed(_)
            | TransportError::HostKeyRejected(_)
            | TransportError::AgentUnavailable(_)
            | TransportError::KeyLoadFailed { .. }
            | TransportError::Key(_) => TransportErrorKind::Authentication,
            TransportError::InvalidPath(_) => TransportErrorKind::InvalidInput,
            TransportError::CommandTimeout(_) | TransportError::Sftp(_) => {
                TransportErrorKind::Other
            }
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == TransportErrorKind::Network
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == TransportErrorKind::Authentication
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == TransportErrorKind::InvalidInput
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
