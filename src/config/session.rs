// ABOUTME: Immutable connection parameters for one remote host.
// ABOUTME: Parses targets like "host", "user@host", "host:port", "user@host:port".

use super::error::{ConfigError, InvalidTargetSnafu};
use super::host_keys::HostKeyPolicy;
use super::retry::RetryPolicy;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PORT: u16 = 22;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters used to open a remote session.
///
/// Built once with [`SessionConfig::new`] or [`SessionConfig::parse`] and the
/// `with_*` methods; read through accessors afterwards.
#[derive(Clone, PartialEq)]
pub struct SessionConfig {
    hostname: String,
    username: String,
    password: Option<String>,
    key_path: Option<PathBuf>,
    port: u16,
    quiet: bool,
    retry: RetryPolicy,
    host_key_policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
    connect_timeout: Duration,
    command_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Configuration for `hostname` with the invoking user and port 22.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            username: default_username(),
            password: None,
            key_path: None,
            port: DEFAULT_PORT,
            quiet: false,
            retry: RetryPolicy::default(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: None,
        }
    }

    /// Parse `[user@]host[:port]`.
    ///
    /// An IPv6 address with a port is written `[addr]:port`; a bare address
    /// with more than one colon is taken whole, on the default port.
    pub fn parse(target: &str) -> Result<Self, ConfigError> {
        let s = target.trim();
        if s.is_empty() {
            return InvalidTargetSnafu {
                input: target,
                reason: "target cannot be empty",
            }
            .fail();
        }

        let (user_part, rest) = match s.find('@') {
            Some(at_pos) => (Some(&s[..at_pos]), &s[at_pos + 1..]),
            None => (None, s),
        };

        let (host, port) = split_host_port(rest).map_err(|reason| ConfigError::InvalidTarget {
            input: target.to_string(),
            reason,
        })?;

        if host.is_empty() {
            return InvalidTargetSnafu {
                input: target,
                reason: "hostname cannot be empty",
            }
            .fail();
        }

        let mut config = Self::new(host).with_port(port)?;
        if let Some(user) = user_part.filter(|u| !u.is_empty()) {
            config = config.with_username(user);
        }
        Ok(config)
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    /// Set the SSH port. Port 0 is rejected.
    pub fn with_port(mut self, port: u16) -> Result<Self, ConfigError> {
        if port == 0 {
            return InvalidTargetSnafu {
                input: self.hostname.clone(),
                reason: "invalid port: 0",
            }
            .fail();
        }
        self.port = port;
        Ok(self)
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn with_known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        self.host_key_policy
    }

    pub fn known_hosts_path(&self) -> Option<&Path> {
        self.known_hosts_path.as_deref()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Per-command timeout. `None` waits for the command indefinitely.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    /// `user@host:port`, used in log lines and error messages. IPv6
    /// addresses are bracketed.
    pub fn target(&self) -> String {
        if self.hostname.contains(':') {
            format!("{}@[{}]:{}", self.username, self.hostname, self.port)
        } else {
            format!("{}@{}:{}", self.username, self.hostname, self.port)
        }
    }

    /// Equivalent OpenSSH command line, for logging.
    pub fn ssh_command_line(&self) -> String {
        match &self.key_path {
            Some(key) => format!(
                "ssh -i {} -p {} {}@{}",
                key.display(),
                self.port,
                self.username,
                self.hostname
            ),
            None => format!("ssh -p {} {}@{}", self.port, self.username, self.hostname),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_path", &self.key_path)
            .field("port", &self.port)
            .field("quiet", &self.quiet)
            .field("retry", &self.retry)
            .field("host_key_policy", &self.host_key_policy)
            .field("known_hosts_path", &self.known_hosts_path)
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

/// Split `host[:port]`, `[addr]:port` or a bare IPv6 address.
fn split_host_port(s: &str) -> Result<(&str, u16), String> {
    if let Some(bracketed) = s.strip_prefix('[') {
        let (addr, after) = bracketed
            .split_once(']')
            .ok_or_else(|| "missing ']' after IPv6 address".to_string())?;
        return match after {
            "" => Ok((addr, DEFAULT_PORT)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((addr, parse_port(port)?)),
                None => Err(format!("unexpected text after ']': {after}")),
            },
        };
    }
    match s.matches(':').count() {
        0 => Ok((s, DEFAULT_PORT)),
        1 => {
            let (host, port) = s.split_once(':').unwrap_or((s, ""));
            Ok((host, parse_port(port)?))
        }
        _ => Ok((s, DEFAULT_PORT)),
    }
}

fn parse_port(s: &str) -> Result<u16, String> {
    s.parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| format!("invalid port: {s}"))
}

/// Name of the invoking OS user.
pub fn default_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "root".to_string())
}
