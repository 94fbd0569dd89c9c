// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (results only), and JSON output modes.

use crate::result::CommandResult;
use serde::Serialize;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with status lines
    Normal,
    /// Only remote output, nothing added
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Print the outcome of a remote command.
    pub fn result(&self, result: &CommandResult) {
        match self.mode {
            OutputMode::Normal => {
                print!("{}", result.stdout());
                eprint!("{}", result.stderr());
                match result.exit_status() {
                    Some(status) => {
                        eprintln!("[exit status {status}] ({:.1}s)", result.duration_secs())
                    }
                    None => eprintln!("[no exit status] ({:.1}s)", result.duration_secs()),
                }
            }
            OutputMode::Quiet => {
                print!("{}", result.stdout());
                eprint!("{}", result.stderr());
            }
            OutputMode::Json => {
                let event = ResultEvent {
                    event: "result",
                    result,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print a success message (suppressed in quiet mode).
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct ResultEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    result: &'a CommandResult,
}
