// ABOUTME: Runs one command against a transport with bounded network retries.
// ABOUTME: Normalizes transport output into a CommandResult and enforces ignore_status.

use crate::config::SessionConfig;
use crate::error::{CommandError, Error, ExhaustedError, Result};
use crate::result::CommandResult;
use crate::transport::{RawOutput, Transport, TransportError};
use chrono::Utc;
use std::time::Instant;

/// Executes commands for one session configuration.
///
/// Network-layer transport errors are retried on a fresh session according
/// to the configuration's [`RetryPolicy`](crate::config::RetryPolicy).
/// Authentication errors and other transport errors are returned at once.
pub struct Executor<'a, T: Transport> {
    transport: &'a T,
    config: &'a SessionConfig,
}

impl<'a, T: Transport> Executor<'a, T> {
    pub fn new(transport: &'a T, config: &'a SessionConfig) -> Self {
        Self { transport, config }
    }

    /// Run `command`, opening a session into `session` if none is held.
    ///
    /// On success the (possibly reopened) session is left in `session` for
    /// the caller to reuse or close. A failed result is returned as
    /// [`Error::Command`] unless `ignore_status` is set; a command that never
    /// got an answer is returned as [`Error::ConnectionExhausted`] carrying
    /// a result with the no-response exit status.
    pub async fn execute(
        &self,
        session: &mut Option<T::Session>,
        command: &str,
        ignore_status: bool,
        quiet: bool,
    ) -> Result<CommandResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        if !quiet {
            tracing::info!(host = %self.config.hostname(), "run: {}", command);
        }

        let policy = self.config.retry();
        let mut attempts = 0;
        let mut last_error: Option<TransportError> = None;
        let output = loop {
            attempts += 1;
            match self.attempt(session, command, quiet).await {
                Ok(output) => break Some(output),
                Err(e) if e.is_network() => {
                    tracing::warn!(
                        remote = %self.config.target(),
                        attempt = attempts,
                        error = %e,
                        "network error running '{}'",
                        command
                    );
                    if let Some(stale) = session.take() {
                        self.discard(stale).await;
                    }
                    last_error = Some(e);
                    if !policy.allows_retry_after(attempts) {
                        break None;
                    }
                    tokio::time::sleep(policy.delay_after(attempts)).await;
                }
                Err(e) => return Err(Error::from_transport(e)),
            }
        };
        let duration = start.elapsed();

        let Some(output) = output else {
            let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
            let result = CommandResult::no_response(command, &reason, duration, started_at);
            if ignore_status {
                return Ok(result);
            }
            return Err(ExhaustedError::new(self.config.target(), attempts, reason)
                .with_result(result)
                .into());
        };

        let result = CommandResult::from_output(command, output, duration, started_at);
        tracing::debug!(
            command,
            exit_status = ?result.exit_status(),
            duration_secs = result.duration_secs(),
            "command finished"
        );
        if result.failed() && !ignore_status {
            return Err(CommandError::new(command, result).into());
        }
        Ok(result)
    }

    /// Open a session, retrying network-layer failures.
    pub async fn open(&self) -> Result<T::Session> {
        let policy = self.config.retry();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.transport.open(self.config).await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_network() => {
                    tracing::warn!(
                        remote = %self.config.target(),
                        attempt = attempts,
                        error = %e,
                        "failed to open session"
                    );
                    if !policy.allows_retry_after(attempts) {
                        return Err(ExhaustedError::new(
                            self.config.target(),
                            attempts,
                            e.to_string(),
                        )
                        .into());
                    }
                    tokio::time::sleep(policy.delay_after(attempts)).await;
                }
                Err(e) => return Err(Error::from_transport(e)),
            }
        }
    }

    async fn attempt(
        &self,
        session: &mut Option<T::Session>,
        command: &str,
        quiet: bool,
    ) -> std::result::Result<RawOutput, TransportError> {
        let open = match session.take() {
            Some(open) => open,
            None => self.transport.open(self.config).await?,
        };
        let output = self.transport.execute(&open, command, quiet).await;
        *session = Some(open);
        output
    }

    async fn discard(&self, session: T::Session) {
        if let Err(e) = self.transport.close(session).await {
            tracing::debug!(error = %e, "failed to close broken session");
        }
    }
}
