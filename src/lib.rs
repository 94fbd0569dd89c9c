// ABOUTME: Library root for remote-exec - remote command execution over SSH.
// ABOUTME: The CLI binary is in main.rs.

pub mod blocking;
pub mod config;
pub mod error;
pub mod executor;
pub mod output;
pub mod remote;
pub mod result;
pub mod ssh;
pub mod transport;

pub use config::{RetryPolicy, SessionConfig};
pub use error::{AuthenticationError, CommandError, Error, ErrorKind, ExhaustedError, Result};
pub use remote::Remote;
pub use result::{CommandResult, NO_RESPONSE_EXIT_STATUS};
