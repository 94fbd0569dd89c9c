// ABOUTME: SSH transport for remote command execution and file transfer.
// ABOUTME: Supports password, key, and agent authentication with known_hosts verification.

mod auth;
mod client;
mod known_hosts;
mod transfer;

pub use client::Session;

use crate::config::SessionConfig;
use crate::transport::{RawOutput, Result, Transport};
use async_trait::async_trait;
use std::path::Path;

/// [`Transport`] over SSH, with SFTP for file copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshTransport;

#[async_trait]
impl Transport for SshTransport {
    type Session = Session;

    async fn open(&self, config: &SessionConfig) -> Result<Session> {
        Session::connect(config).await
    }

    async fn execute(&self, session: &Session, command: &str, quiet: bool) -> Result<RawOutput> {
        session.exec(command, quiet).await
    }

    async fn upload(
        &self,
        session: &Session,
        local_path: &Path,
        remote_path: &str,
        preserve_mode: bool,
    ) -> Result<()> {
        session.upload(local_path, remote_path, preserve_mode).await
    }

    async fn download(&self, session: &Session, remote_path: &str, local_path: &Path) -> Result<()> {
        session.download(remote_path, local_path).await
    }

    async fn close(&self, session: Session) -> Result<()> {
        session.disconnect().await
    }
}
