// ABOUTME: YAML hosts file mapping names to connection parameters.
// ABOUTME: Resolves a named entry into a SessionConfig.

use super::error::{ConfigError, ParseSnafu, ReadSnafu};
use super::host_keys::HostKeyPolicy;
use super::retry::RetryPolicy;
use super::session::SessionConfig;
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOSTS_FILENAME: &str = "remote.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct HostsFile {
    #[serde(default)]
    pub hosts: BTreeMap<String, HostEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostEntry {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    /// Private key file. A leading `~/` expands to `$HOME`.
    #[serde(default)]
    pub key: Option<PathBuf>,
    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default)]
    pub quiet: bool,
    /// Handling of host keys missing from known_hosts.
    #[serde(default)]
    pub host_keys: HostKeyPolicy,
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default, with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub command_timeout: Option<Duration>,
}

fn default_port() -> u16 {
    22
}

impl HostsFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).context(ParseSnafu)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Self::from_yaml(&content)
    }

    pub fn get(&self, name: &str) -> Result<&HostEntry, ConfigError> {
        self.hosts.get(name).ok_or_else(|| ConfigError::UnknownHost {
            name: name.to_string(),
        })
    }

    /// Resolve a named host into a session configuration.
    pub fn session_config(&self, name: &str) -> Result<SessionConfig, ConfigError> {
        self.get(name)?.session_config()
    }
}

impl HostEntry {
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = SessionConfig::new(&self.host)
            .with_port(self.port)?
            .with_quiet(self.quiet)
            .with_host_key_policy(self.host_keys);

        if let Some(user) = &self.user {
            config = config.with_username(user);
        }
        if let Some(key) = &self.key {
            config = config.with_key_path(expand_home(key));
        }
        if let Some(var) = &self.password_env {
            config = config.with_password(password_from_env(var)?);
        }
        if let Some(path) = &self.known_hosts {
            config = config.with_known_hosts_path(expand_home(path));
        }
        if let Some(retry) = &self.retry {
            config = config.with_retry(retry.clone());
        }
        if let Some(timeout) = self.connect_timeout {
            config = config.with_connect_timeout(timeout);
        }
        if let Some(timeout) = self.command_timeout {
            config = config.with_command_timeout(timeout);
        }
        Ok(config)
    }
}

/// Read a password from the named environment variable.
pub fn password_from_env(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnvVar {
        name: var.to_string(),
    })
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => Path::new(&home).join(rest),
        _ => path.to_path_buf(),
    }
}
