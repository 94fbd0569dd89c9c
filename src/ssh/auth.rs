// ABOUTME: SSH user authentication for an established connection.
// ABOUTME: Offers configured credentials, then the agent and default key files.

use super::known_hosts::HostKeyVerifier;
use crate::config::SessionConfig;
use crate::transport::{Result, TransportError};
use russh::client::Handle;
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_KEY_FILES: [&str; 3] = [".ssh/id_ed25519", ".ssh/id_rsa", ".ssh/id_ecdsa"];

/// Authenticate `config.username()` on `handle`.
///
/// A configured password is offered alone, otherwise a configured key file
/// alone. Without either, every agent identity and then every readable
/// default key file is offered until one is accepted. Returns the name of
/// the accepted method.
pub(crate) async fn authenticate(
    handle: &mut Handle<HostKeyVerifier>,
    config: &SessionConfig,
) -> Result<&'static str> {
    let user = config.username();

    if let Some(password) = config.password() {
        let accepted = handle.authenticate_password(user, password).await?.success();
        return accepted_or_rejected(accepted, "password", config);
    }

    if let Some(path) = config.key_path() {
        let key = load_key(path)?;
        let accepted = offer_key(handle, user, key).await?;
        return accepted_or_rejected(accepted, "publickey", config);
    }

    let agent_error = match offer_agent(handle, user).await {
        Ok(true) => return Ok("agent"),
        Ok(false) => None,
        Err(e) => Some(e),
    };

    let mut offered_default = false;
    for path in default_key_files() {
        let Ok(key) = load_secret_key(&path, None) else {
            continue;
        };
        offered_default = true;
        if offer_key(handle, user, Arc::new(key)).await? {
            return Ok("publickey");
        }
    }

    match agent_error {
        Some(e) if !offered_default => Err(e),
        _ => accepted_or_rejected(false, "publickey", config),
    }
}

fn accepted_or_rejected(
    accepted: bool,
    method: &'static str,
    config: &SessionConfig,
) -> Result<&'static str> {
    if accepted {
        Ok(method)
    } else {
        Err(TransportError::AuthenticationFailed(format!(
            "{method} authentication rejected for {}",
            config.target()
        )))
    }
}

fn load_key(path: &Path) -> Result<Arc<russh::keys::PrivateKey>> {
    load_secret_key(path, None)
        .map(Arc::new)
        .map_err(|e| TransportError::KeyLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

async fn offer_key(
    handle: &mut Handle<HostKeyVerifier>,
    user: &str,
    key: Arc<russh::keys::PrivateKey>,
) -> Result<bool> {
    let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
    let result = handle
        .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
        .await?;
    Ok(result.success())
}

async fn offer_agent(handle: &mut Handle<HostKeyVerifier>, user: &str) -> Result<bool> {
    let mut agent = AgentClient::connect_env()
        .await
        .map_err(|e| TransportError::AgentUnavailable(e.to_string()))?;
    let identities = agent
        .request_identities()
        .await
        .map_err(|e| TransportError::AgentUnavailable(format!("failed to list agent keys: {e}")))?;

    for identity in identities {
        let offered = handle
            .authenticate_publickey_with(user, identity, None, &mut agent)
            .await;
        if matches!(offered, Ok(result) if result.success()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn default_key_files() -> Vec<PathBuf> {
    match std::env::var("HOME") {
        Ok(home) => DEFAULT_KEY_FILES
            .iter()
            .map(|name| Path::new(&home).join(name))
            .collect(),
        Err(_) => Vec::new(),
    }
}
