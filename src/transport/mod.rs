// ABOUTME: Transport abstraction used by the command executor.
// ABOUTME: A transport opens sessions and runs commands and file copies over them.

mod error;

pub use error::{Result, TransportError, TransportErrorKind};

use crate::config::SessionConfig;
use async_trait::async_trait;
use std::path::Path;

/// Output reported by a transport for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Exit status, if the remote side reported one.
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The remote process was terminated by SIGINT.
    pub interrupted: bool,
}

impl RawOutput {
    /// Output of a process that exited normally.
    pub fn exited(
        exit_status: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            exit_status: Some(exit_status),
            stdout: stdout.into(),
            stderr: stderr.into(),
            interrupted: false,
        }
    }
}

/// Session-oriented remote transport.
///
/// Implementations own connection establishment and authentication. The
/// executor treats errors whose [`TransportErrorKind`] is `Network` as
/// transient and everything else as final.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Live, authenticated connection handle.
    type Session: Send + Sync;

    /// Open and authenticate a session for the given configuration.
    async fn open(&self, config: &SessionConfig) -> Result<Self::Session>;

    /// Run a command on the session. `quiet` suppresses local echo of its output.
    async fn execute(
        &self,
        session: &Self::Session,
        command: &str,
        quiet: bool,
    ) -> Result<RawOutput>;

    /// Copy a local file to the remote host.
    async fn upload(
        &self,
        session: &Self::Session,
        local_path: &Path,
        remote_path: &str,
        preserve_mode: bool,
    ) -> Result<()>;

    /// Copy a remote file to the local host.
    async fn download(
        &self,
        session: &Self::Session,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()>;

    /// Close the session.
    async fn close(&self, session: Self::Session) -> Result<()>;
}
