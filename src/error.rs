// ABOUTME: Error types surfaced to callers of the remote client.
// ABOUTME: Command, authentication, exhausted-connection and transport failures.

use crate::config::ConfigError;
use crate::result::CommandResult;
use crate::transport::{TransportError, TransportErrorKind};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    ConnectionExhausted(#[from] ExhaustedError),

    #[error("transport error: {0}")]
    Transport(TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command ran (or was attempted) and did not succeed.
    Command,
    /// Credentials or handshake rejected.
    Authentication,
    /// Network failures persisted past the retry bound.
    ConnectionExhausted,
    /// Non-retryable transport failure.
    Transport,
    Config,
    Io,
}

impl Error {
    /// Convert a transport failure, lifting credential problems into
    /// [`AuthenticationError`].
    pub fn from_transport(err: TransportError) -> Self {
        match err.kind() {
            TransportErrorKind::Authentication => {
                Error::Authentication(AuthenticationError::new(err.to_string()))
            }
            _ => Error::Transport(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Command(_) => ErrorKind::Command,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::ConnectionExhausted(_) => ErrorKind::ConnectionExhausted,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// The transport rejected a path or other argument.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_invalid_input())
    }

    /// The command result attached to this error, if any.
    pub fn result(&self) -> Option<&CommandResult> {
        match self {
            Error::Command(e) => Some(e.result()),
            Error::ConnectionExhausted(e) => e.result(),
            _ => None,
        }
    }
}

/// A remote command failed: non-zero exit, interrupted, or no exit status.
#[derive(Debug)]
pub struct CommandError {
    command: String,
    result: Box<CommandResult>,
    additional_text: Option<String>,
}

impl CommandError {
    pub fn new(command: impl Into<String>, result: CommandResult) -> Self {
        Self {
            command: command.into(),
            result: Box::new(result),
            additional_text: None,
        }
    }

    /// Attach extra context appended to the message.
    pub fn with_additional_text(mut self, text: impl Into<String>) -> Self {
        self.additional_text = Some(text.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn result(&self) -> &CommandResult {
        &self.result
    }

    pub fn additional_text(&self) -> Option<&str> {
        self.additional_text.as_deref()
    }

    pub fn into_result(self) -> CommandResult {
        *self.result
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.result.interrupted() {
            return write!(f, "Command {} interrupted by user (Ctrl+C)", self.command);
        }
        match self.result.exit_status() {
            Some(rc) => write!(f, "Command '{}' failed (rc={rc})", self.command)?,
            None => write!(
                f,
                "Command '{}' failed and is not responding to signals",
                self.command
            )?,
        }
        if let Some(text) = &self.additional_text {
            write!(f, ", {text}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandError {}

/// Credentials or handshake were rejected by the remote host.
#[derive(Debug, Clone, Error)]
#[error("authentication error (wrong credentials or rejected handshake): {message}")]
pub struct AuthenticationError {
    message: String,
}

impl AuthenticationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message reported by the transport.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Network-layer failures outlasted the retry policy.
#[derive(Debug, Error)]
#[error("connection to {target} exhausted after {attempts} attempt(s): {last_error}")]
pub struct ExhaustedError {
    target: String,
    attempts: u32,
    last_error: String,
    result: Option<Box<CommandResult>>,
}

impl ExhaustedError {
    pub fn new(target: impl Into<String>, attempts: u32, last_error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attempts,
            last_error: last_error.into(),
            result: None,
        }
    }

    /// Attach the no-response result of the command that was being run.
    pub fn with_result(mut self, result: CommandResult) -> Self {
        self.result = Some(Box::new(result));
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn result(&self) -> Option<&CommandResult> {
        self.result.as_deref()
    }
}
