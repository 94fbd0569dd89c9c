// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the target options and all subcommands.

use clap::{Args, Parser, Subcommand};
use remote_exec::config::HostKeyPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remote-exec")]
#[command(about = "Run commands and copy files on a remote host over SSH")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only remote output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Target as [user@]host[:port]
    #[arg(short = 'H', long, conflicts_with = "name")]
    pub host: Option<String>,

    /// Host name from the hosts file
    #[arg(short, long)]
    pub name: Option<String>,

    /// Hosts file
    #[arg(short, long, default_value = "remote.yml")]
    pub config: PathBuf,

    /// Remote user (default: current user)
    #[arg(short, long)]
    pub user: Option<String>,

    /// SSH port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Private key file
    #[arg(short = 'i', long)]
    pub key: Option<PathBuf>,

    /// Environment variable holding the password
    #[arg(long)]
    pub password_env: Option<String>,

    /// Unknown host keys: accept-new (default), trust-on-first-use, or strict
    #[arg(long, value_name = "POLICY")]
    pub host_keys: Option<HostKeyPolicy>,

    /// Connection attempts before giving up
    #[arg(long)]
    pub attempts: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a command on the remote host
    Run {
        /// Do not fail on a non-zero exit status
        #[arg(long)]
        ignore_status: bool,

        /// Command to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check that the host answers
    Uptime,

    /// Create a remote directory
    Mkdir {
        /// Remote directory path
        path: String,
    },

    /// Upload a file
    Put {
        /// Local file
        local: PathBuf,
        /// Remote destination
        remote: String,
    },

    /// Download a file
    Get {
        /// Remote file
        remote: String,
        /// Local destination
        local: PathBuf,
    },
}
