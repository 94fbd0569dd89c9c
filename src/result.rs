// ABOUTME: Normalized outcome of one remote command execution.
// ABOUTME: Exit status, captured output, timing and derived success flags.

use crate::transport::RawOutput;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Reserved exit status meaning "the transport never returned a result".
///
/// Real exit codes live in 0..=255 (and signal-derived values above), so a
/// negative value cannot collide with one.
pub const NO_RESPONSE_EXIT_STATUS: i32 = -300;

/// Result of one remote command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    command: String,
    exit_status: Option<i32>,
    stdout: String,
    stderr: String,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    duration: Duration,
    interrupted: bool,
    started_at: DateTime<Utc>,
}

impl CommandResult {
    /// Build a result from what the transport reported.
    pub fn from_output(
        command: impl Into<String>,
        output: RawOutput,
        duration: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            command: command.into(),
            exit_status: output.exit_status,
            stdout: output.stdout,
            stderr: output.stderr,
            duration,
            interrupted: output.interrupted,
            started_at,
        }
    }

    /// Build the result for a command the transport never answered.
    pub fn no_response(
        command: impl Into<String>,
        reason: &str,
        duration: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            command: command.into(),
            exit_status: Some(NO_RESPONSE_EXIT_STATUS),
            stdout: format!("Unable to get stdout ({reason})"),
            stderr: format!("Unable to get stderr ({reason})"),
            duration,
            interrupted: false,
            started_at,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Exit status; `None` when the remote side never reported one.
    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn succeeded(&self) -> bool {
        self.exit_status == Some(0)
    }

    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// The transport never produced a result for this command.
    pub fn is_no_response(&self) -> bool {
        self.exit_status == Some(NO_RESPONSE_EXIT_STATUS)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command: {}", self.command)?;
        match self.exit_status {
            Some(status) => writeln!(f, "Exit status: {status}")?,
            None => writeln!(f, "Exit status: none")?,
        }
        writeln!(f, "Duration: {:.3}s", self.duration_secs())?;
        writeln!(f, "Stdout:\n{}", self.stdout)?;
        writeln!(f, "Stderr:\n{}", self.stderr)?;
        if self.interrupted {
            writeln!(f, "Command interrupted by user (Ctrl+C)")?;
        }
        Ok(())
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
