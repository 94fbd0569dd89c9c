// ABOUTME: Entry point for the remote-exec CLI application.
// ABOUTME: Parses arguments, resolves the target and dispatches to the remote client.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, TargetArgs};
use remote_exec::config::{ConfigError, HostsFile, password_from_env};
use remote_exec::output::{Output, OutputMode};
use remote_exec::{CommandResult, Remote, Result, SessionConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    match run(cli, &output).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<i32> {
    let config = session_config(&cli.target)?.with_quiet(cli.quiet || cli.json);
    let remote = Remote::new(config);

    match cli.command {
        Commands::Run {
            ignore_status,
            command,
        } => {
            let command = command.join(" ");
            let result = remote.run(&command, ignore_status).await?;
            output.result(&result);
            Ok(exit_code(&result))
        }
        Commands::Uptime => match remote.uptime().await {
            Some(result) => {
                output.result(&result);
                Ok(0)
            }
            None => {
                output.error(&format!("{} did not answer", remote.config().target()));
                Ok(1)
            }
        },
        Commands::Mkdir { path } => {
            remote.makedir(&path).await?;
            output.success(&format!("created {path}"));
            Ok(0)
        }
        Commands::Put { local, remote: dest } => {
            if remote.send_files(&local, &dest).await {
                output.success(&format!("uploaded {} to {dest}", local.display()));
                Ok(0)
            } else {
                output.error(&format!("upload of {} failed", local.display()));
                Ok(1)
            }
        }
        Commands::Get { remote: src, local } => {
            if remote.receive_files(&local, &src).await {
                output.success(&format!("downloaded {src} to {}", local.display()));
                Ok(0)
            } else {
                output.error(&format!("download of {src} failed"));
                Ok(1)
            }
        }
    }
}

/// Resolve the target from `--name` (hosts file) or `--host`, then apply overrides.
fn session_config(args: &TargetArgs) -> std::result::Result<SessionConfig, ConfigError> {
    let mut config = match (&args.name, &args.host) {
        (Some(name), _) => HostsFile::load(&args.config)?.session_config(name)?,
        (None, Some(host)) => SessionConfig::parse(host)?,
        (None, None) => return Err(ConfigError::MissingTarget),
    };

    if let Some(user) = &args.user {
        config = config.with_username(user);
    }
    if let Some(port) = args.port {
        config = config.with_port(port)?;
    }
    if let Some(key) = &args.key {
        config = config.with_key_path(key);
    }
    if let Some(var) = &args.password_env {
        config = config.with_password(password_from_env(var)?);
    }
    if let Some(policy) = args.host_keys {
        config = config.with_host_key_policy(policy);
    }
    if let Some(attempts) = args.attempts {
        let retry = config.retry().clone().with_max_attempts(attempts);
        config = config.with_retry(retry);
    }
    Ok(config)
}

/// Process exit code mirroring the remote exit status.
fn exit_code(result: &CommandResult) -> i32 {
    match result.exit_status() {
        Some(0) => 0,
        Some(status) if (1..=255).contains(&status) => status,
        _ => 1,
    }
}
