// ABOUTME: Public async client for one remote host.
// ABOUTME: Run commands, probe uptime, create directories and copy files.

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::result::CommandResult;
use crate::ssh::SshTransport;
use crate::transport::Transport;
use std::path::Path;

/// Client for one remote host.
///
/// Every operation opens its own session with this client's configuration
/// and closes it before returning, whatever the outcome. Clients for
/// different hosts share no state and can be used concurrently.
pub struct Remote<T: Transport = SshTransport> {
    config: SessionConfig,
    transport: T,
}

impl Remote<SshTransport> {
    /// Client using the SSH transport.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_transport(config, SshTransport)
    }
}

impl<T: Transport> Remote<T> {
    pub fn with_transport(config: SessionConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a remote command.
    ///
    /// Output is echoed to the log unless the configuration is quiet. A
    /// non-zero exit is an error unless `ignore_status` is set.
    pub async fn run(&self, command: &str, ignore_status: bool) -> Result<CommandResult> {
        self.run_with(command, ignore_status, self.config.is_quiet())
            .await
    }

    /// Run a remote command without echoing it or its output.
    pub async fn run_quiet(&self, command: &str, ignore_status: bool) -> Result<CommandResult> {
        self.run_with(command, ignore_status, true).await
    }

    /// Run `uptime` as a reachability probe.
    ///
    /// Returns the result when `uptime` exits 0 and `None` on any failure.
    pub async fn uptime(&self) -> Option<CommandResult> {
        match self.run("uptime", true).await {
            Ok(result) if result.succeeded() => Some(result),
            Ok(result) => {
                tracing::debug!(host = %self.config.hostname(), exit_status = ?result.exit_status(), "uptime probe failed");
                None
            }
            Err(e) => {
                tracing::debug!(host = %self.config.hostname(), error = %e, "uptime probe failed");
                None
            }
        }
    }

    /// Create a remote directory and any missing parents.
    pub async fn makedir(&self, remote_path: &str) -> Result<()> {
        self.run(&format!("mkdir -p {remote_path}"), false).await?;
        Ok(())
    }

    /// Upload a file, preserving its local mode.
    ///
    /// Returns `false` when the copy did not happen for any reason; the cause
    /// is logged.
    pub async fn send_files(&self, local_path: impl AsRef<Path>, remote_path: &str) -> bool {
        let local_path = local_path.as_ref();
        let outcome = match self.open_session().await {
            Ok(session) => {
                let uploaded = self
                    .transport
                    .upload(&session, local_path, remote_path, true)
                    .await;
                self.release(Some(session)).await;
                uploaded.map_err(Error::from_transport)
            }
            Err(e) => Err(e),
        };
        transfer_outcome("send_files", outcome)
    }

    /// Download a remote file to `local_path`. Same contract as [`Remote::send_files`].
    pub async fn receive_files(&self, local_path: impl AsRef<Path>, remote_path: &str) -> bool {
        let local_path = local_path.as_ref();
        let outcome = match self.open_session().await {
            Ok(session) => {
                let downloaded = self
                    .transport
                    .download(&session, remote_path, local_path)
                    .await;
                self.release(Some(session)).await;
                downloaded.map_err(Error::from_transport)
            }
            Err(e) => Err(e),
        };
        transfer_outcome("receive_files", outcome)
    }

    async fn run_with(
        &self,
        command: &str,
        ignore_status: bool,
        quiet: bool,
    ) -> Result<CommandResult> {
        self.announce();
        let mut session = None;
        let result = Executor::new(&self.transport, &self.config)
            .execute(&mut session, command, ignore_status, quiet)
            .await;
        self.release(session).await;
        result
    }

    async fn open_session(&self) -> Result<T::Session> {
        self.announce();
        Executor::new(&self.transport, &self.config).open().await
    }

    async fn release(&self, session: Option<T::Session>) {
        let Some(session) = session else {
            return;
        };
        if let Err(e) = self.transport.close(session).await {
            tracing::warn!(
                "session close failed for {}: {}",
                self.config.target(),
                e
            );
        }
    }

    fn announce(&self) {
        tracing::debug!("connecting: {}", self.config.ssh_command_line());
    }
}

fn transfer_outcome(operation: &str, outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), "{} failed: {}", operation, e);
            false
        }
    }
}
