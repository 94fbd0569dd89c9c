// ABOUTME: Configuration error types with SNAFU pattern.
// ABOUTME: Covers hosts file loading, target parsing and credential lookup.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("failed to read hosts file {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse hosts file: {source}"))]
    Parse { source: serde_yaml::Error },

    #[snafu(display("unknown host: {name}"))]
    UnknownHost { name: String },

    #[snafu(display("invalid target '{input}': {reason}"))]
    InvalidTarget { input: String, reason: String },

    #[snafu(display("missing required environment variable: {name}"))]
    MissingEnvVar { name: String },

    #[snafu(display("no target given (use --host or --name)"))]
    MissingTarget,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The hosts file could not be read or parsed.
    HostsFile,
    /// The requested target does not exist or is malformed.
    Target,
    /// A credential referenced by the configuration is unavailable.
    Credential,
}

impl ConfigError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::Read { .. } | ConfigError::Parse { .. } => ConfigErrorKind::HostsFile,
            ConfigError::UnknownHost { .. }
            | ConfigError::InvalidTarget { .. }
            | ConfigError::MissingTarget => ConfigErrorKind::Target,
            ConfigError::MissingEnvVar { .. } => ConfigErrorKind::Credential,
        }
    }
}
