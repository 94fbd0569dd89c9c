// ABOUTME: SFTP file transfer over an established SSH session.
// ABOUTME: Single-file upload (optionally preserving mode) and download.

use super::client::Session;
use crate::transport::{Result, TransportError as Error};
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::{FileAttributes, OpenFlags};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

impl Session {
    /// Start an SFTP subsystem on a new channel.
    ///
    /// The remote sshd must have an sftp subsystem configured.
    async fn sftp(&self) -> Result<SftpSession> {
        let channel = self
            .handle()
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;
        channel.request_subsystem(true, "sftp").await?;
        Ok(SftpSession::new(channel.into_stream()).await?)
    }

    /// Upload a local file to `remote_path`.
    ///
    /// With `preserve_mode` the remote file gets the local permission bits.
    pub async fn upload(&self, local_path: &Path, remote_path: &str, preserve_mode: bool) -> Result<()> {
        if remote_path.is_empty() {
            return Err(Error::InvalidPath("remote path is empty".to_string()));
        }
        let metadata = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| Error::InvalidPath(format!("{}: {}", local_path.display(), e)))?;
        if !metadata.is_file() {
            return Err(Error::InvalidPath(format!(
                "{} is not a regular file",
                local_path.display()
            )));
        }
        let contents = tokio::fs::read(local_path).await?;

        let sftp = self.sftp().await?;
        let mut file = sftp
            .open_with_flags(
                remote_path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;
        file.write_all(&contents).await?;
        file.flush().await?;
        file.shutdown().await?;

        if preserve_mode && let Some(mode) = permission_bits(&metadata) {
            let attributes = FileAttributes {
                permissions: Some(mode),
                ..Default::default()
            };
            sftp.set_metadata(remote_path, attributes).await?;
        }

        tracing::debug!(
            host = %self.config().hostname(),
            bytes = contents.len(),
            "uploaded {} to {}",
            local_path.display(),
            remote_path
        );
        Ok(())
    }

    /// Download `remote_path` into a local file.
    pub async fn download(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        if remote_path.is_empty() {
            return Err(Error::InvalidPath("remote path is empty".to_string()));
        }
        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.is_dir()
        {
            return Err(Error::InvalidPath(format!(
                "local directory {} does not exist",
                parent.display()
            )));
        }

        let sftp = self.sftp().await?;
        let mut remote_file = sftp.open_with_flags(remote_path, OpenFlags::READ).await?;
        let mut contents = Vec::new();
        remote_file.read_to_end(&mut contents).await?;

        tokio::fs::write(local_path, &contents).await?;

        tracing::debug!(
            host = %self.config().hostname(),
            bytes = contents.len(),
            "downloaded {} to {}",
            remote_path,
            local_path.display()
        );
        Ok(())
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}
