// ABOUTME: Server host key verification for outgoing SSH connections.
// ABOUTME: Checks known_hosts and applies the configured policy to unseen hosts.

use crate::config::{HostKeyPolicy, SessionConfig};
use russh::client;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key::PublicKey;
use std::path::PathBuf;

/// Outcome of looking a server key up in known_hosts.
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    Known,
    Unknown,
    Changed,
    Unreadable,
}

/// russh client handler applying a [`HostKeyPolicy`] to server keys. A
/// changed key is always rejected.
pub(crate) struct HostKeyVerifier {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts: Option<PathBuf>,
}

impl HostKeyVerifier {
    pub(crate) fn new(config: &SessionConfig) -> Self {
        Self {
            host: config.hostname().to_string(),
            port: config.port(),
            policy: config.host_key_policy(),
            known_hosts: config.known_hosts_path().map(PathBuf::from),
        }
    }

    fn lookup(&self, key: &PublicKey) -> Lookup {
        let checked = match &self.known_hosts {
            Some(path) => check_known_hosts_path(&self.host, self.port, key, path),
            None => check_known_hosts(&self.host, self.port, key),
        };
        match checked {
            Ok(true) => Lookup::Known,
            Ok(false) => Lookup::Unknown,
            Err(russh::keys::Error::KeyChanged { .. }) => Lookup::Changed,
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "known_hosts lookup failed");
                Lookup::Unreadable
            }
        }
    }

    fn remember(&self, key: &PublicKey) {
        let learned = match &self.known_hosts {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = learned {
            tracing::warn!(host = %self.host, error = %e, "could not record host key");
        }
    }
}

impl client::Handler for HostKeyVerifier {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> Result<bool, Self::Error> {
        match self.lookup(key) {
            Lookup::Known => Ok(true),
            Lookup::Changed => {
                tracing::warn!("host key for {}:{} has changed", self.host, self.port);
                Ok(false)
            }
            Lookup::Unknown | Lookup::Unreadable if self.policy.accepts_unknown() => {
                tracing::debug!(
                    "accepting unknown host key for {}:{} ({})",
                    self.host,
                    self.port,
                    self.policy
                );
                if self.policy.records_unknown() {
                    self.remember(key);
                }
                Ok(true)
            }
            Lookup::Unknown | Lookup::Unreadable => Ok(false),
        }
    }
}
