// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection setup and remote command execution.

use super::auth;
use super::known_hosts::HostKeyVerifier;
use crate::config::SessionConfig;
use crate::transport::{RawOutput, Result, TransportError as Error};
use russh::client::{self, Config, Handle};
use russh::{ChannelMsg, Disconnect, Sig};
use std::sync::Arc;
use std::time::Duration;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);
const KEEPALIVE_MAX: usize = 3;
const STDERR_STREAM: u32 = 1;

/// An established, authenticated SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Arc<Handle<HostKeyVerifier>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.config.target())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect to the remote host and authenticate.
    ///
    /// Keyboard-interactive authentication is never attempted, so a server
    /// that would prompt for input fails here instead of blocking.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        // No inactivity timeout; dead peers are detected by keepalives.
        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(KEEPALIVE_INTERVAL),
            keepalive_max: KEEPALIVE_MAX,
            ..Default::default()
        };
        let address = format!("{}:{}", config.hostname(), config.port());

        let connecting = client::connect(
            Arc::new(russh_config),
            (config.hostname(), config.port()),
            HostKeyVerifier::new(config),
        );
        let mut handle = tokio::time::timeout(config.connect_timeout(), connecting)
            .await
            .map_err(|_| Error::ConnectTimeout(address.clone()))?
            .map_err(|e| connect_error(e, &address))?;

        let method = auth::authenticate(&mut handle, config).await?;
        tracing::debug!(remote = %config.target(), method, "SSH session established");

        Ok(Self {
            config: config.clone(),
            handle: Arc::new(handle),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn handle(&self) -> &Handle<HostKeyVerifier> {
        &self.handle
    }

    /// Execute a command, honoring the configured command timeout.
    pub async fn exec(&self, command: &str, quiet: bool) -> Result<RawOutput> {
        match self.config.command_timeout() {
            Some(timeout) => self.exec_with_timeout(command, quiet, timeout).await,
            None => self.exec_inner(command, quiet).await,
        }
    }

    /// Execute a command with a custom timeout.
    pub async fn exec_with_timeout(
        &self,
        command: &str,
        quiet: bool,
        timeout: Duration,
    ) -> Result<RawOutput> {
        tokio::time::timeout(timeout, self.exec_inner(command, quiet))
            .await
            .map_err(|_| Error::CommandTimeout(timeout))?
    }

    async fn exec_inner(&self, command: &str, quiet: bool) -> Result<RawOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {e}")))?;
        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {e}")))?;

        let mut collected = Collected::default();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => {
                    if !quiet {
                        self.echo("out", &data);
                    }
                    collected.stdout.extend_from_slice(&data);
                }
                ChannelMsg::ExtendedData { data, ext } if ext == STDERR_STREAM => {
                    if !quiet {
                        self.echo("err", &data);
                    }
                    collected.stderr.extend_from_slice(&data);
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    collected.exit = Some(Exit::Status(
                        i32::try_from(exit_status).unwrap_or(i32::MAX),
                    ));
                }
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    tracing::debug!(host = %self.config.hostname(), signal = ?signal_name, "remote command killed by signal");
                    collected.exit = Some(Exit::Signal(signal_name));
                }
                ChannelMsg::Eof => collected.eof = true,
                ChannelMsg::Close => break,
                _ => {}
            }
            if collected.is_complete() {
                break;
            }
        }

        collected.into_output()
    }

    fn echo(&self, stream: &str, data: &[u8]) {
        for line in String::from_utf8_lossy(data).lines() {
            tracing::info!(host = %self.config.hostname(), stream, "{}", line);
        }
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

fn connect_error(e: russh::Error, address: &str) -> Error {
    match e {
        russh::Error::UnknownKey => Error::HostKeyRejected(address.to_string()),
        e if e.to_string().contains("Connection refused") => {
            Error::Connection(format!("connection refused to {address}"))
        }
        e => Error::Connection(e.to_string()),
    }
}

/// How the remote command ended.
enum Exit {
    Status(i32),
    Signal(Sig),
}

/// Channel output gathered while a command runs.
#[derive(Default)]
struct Collected {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit: Option<Exit>,
    eof: bool,
}

impl Collected {
    fn is_complete(&self) -> bool {
        self.eof && self.exit.is_some()
    }

    /// A channel that closed without reporting how the command ended means
    /// the connection went away underneath it.
    fn into_output(self) -> Result<RawOutput> {
        let (exit_status, interrupted) = match self.exit {
            Some(Exit::Status(status)) => (Some(status), false),
            Some(Exit::Signal(signal)) => (None, matches!(signal, Sig::INT)),
            None => return Err(Error::ChannelClosed),
        };
        Ok(RawOutput {
            exit_status,
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            interrupted,
        })
    }
}
