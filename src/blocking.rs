// ABOUTME: Blocking wrapper around the async remote client.
// ABOUTME: Drives each operation to completion on a private current-thread runtime.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::result::CommandResult;
use crate::ssh::SshTransport;
use crate::transport::Transport;
use std::path::Path;
use tokio::runtime::{Builder, Runtime};

/// Blocking client for one remote host.
///
/// Calls block the current thread. Must not be used from inside an async
/// runtime; use [`crate::Remote`] there.
pub struct Remote<T: Transport = SshTransport> {
    inner: crate::remote::Remote<T>,
    runtime: Runtime,
}

impl Remote<SshTransport> {
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_transport(config, SshTransport)
    }
}

impl<T: Transport> Remote<T> {
    pub fn with_transport(config: SessionConfig, transport: T) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: crate::remote::Remote::with_transport(config, transport),
            runtime,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        self.inner.config()
    }

    pub fn run(&self, command: &str, ignore_status: bool) -> Result<CommandResult> {
        self.runtime.block_on(self.inner.run(command, ignore_status))
    }

    pub fn run_quiet(&self, command: &str, ignore_status: bool) -> Result<CommandResult> {
        self.runtime
            .block_on(self.inner.run_quiet(command, ignore_status))
    }

    pub fn uptime(&self) -> Option<CommandResult> {
        self.runtime.block_on(self.inner.uptime())
    }

    pub fn makedir(&self, remote_path: &str) -> Result<()> {
        self.runtime.block_on(self.inner.makedir(remote_path))
    }

    pub fn send_files(&self, local_path: impl AsRef<Path>, remote_path: &str) -> bool {
        self.runtime
            .block_on(self.inner.send_files(local_path, remote_path))
    }

    pub fn receive_files(&self, local_path: impl AsRef<Path>, remote_path: &str) -> bool {
        self.runtime
            .block_on(self.inner.receive_files(local_path, remote_path))
    }
}
