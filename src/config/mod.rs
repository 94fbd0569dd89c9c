// ABOUTME: Configuration types for remote sessions.
// ABOUTME: Session parameters, retry policy and the YAML hosts file.

mod error;
mod host_keys;
mod hosts;
mod retry;
mod session;

pub use error::{ConfigError, ConfigErrorKind};
pub use host_keys::HostKeyPolicy;
pub use hosts::{HOSTS_FILENAME, HostEntry, HostsFile, password_from_env};
pub use retry::RetryPolicy;
pub use session::{SessionConfig, default_username};
