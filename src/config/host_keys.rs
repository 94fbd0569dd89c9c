// ABOUTME: Policy for server host keys that are not in known_hosts.
// ABOUTME: Supports accept-new, trust-on-first-use, and strict.

use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// What to do with a server key that known_hosts does not list.
///
/// A key that differs from the recorded one for the same host is rejected
/// under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostKeyPolicy {
    /// Accept unknown keys without recording them.
    #[default]
    AcceptNew,
    /// Accept unknown keys and append them to known_hosts.
    TrustOnFirstUse,
    /// Reject unknown keys.
    Strict,
}

impl HostKeyPolicy {
    pub fn accepts_unknown(self) -> bool {
        !matches!(self, HostKeyPolicy::Strict)
    }

    pub fn records_unknown(self) -> bool {
        matches!(self, HostKeyPolicy::TrustOnFirstUse)
    }
}

impl FromStr for HostKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept-new" => Ok(HostKeyPolicy::AcceptNew),
            "trust-on-first-use" | "tofu" => Ok(HostKeyPolicy::TrustOnFirstUse),
            "strict" => Ok(HostKeyPolicy::Strict),
            _ => Err(format!("unknown host key policy: {}", s)),
        }
    }
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostKeyPolicy::AcceptNew => write!(f, "accept-new"),
            HostKeyPolicy::TrustOnFirstUse => write!(f, "trust-on-first-use"),
            HostKeyPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl<'de> Deserialize<'de> for HostKeyPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
