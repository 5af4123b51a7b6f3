//! deviceiam - command-line IAM client for remote devices.
//!
//! Lists users and roles and manages role assignments on a device.

#![deny(clippy::all)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deviceiam::config::Config;
use deviceiam::error::{AppError, ConfigError, IamError};
use deviceiam::iam::{AssumeYes, Confirm, ConsoleReporter, IamClient, TerminalPrompt};
use deviceiam::secure::SecureString;
use deviceiam::transport::HttpConnection;

/// Exit code for an operation the device refused or that failed in transit.
const EXIT_FAILURE: u8 = 1;

/// Exit code for missing or invalid configuration.
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "deviceiam", version, about = "Manage users and roles on a device")]
struct Cli {
    /// Device gateway URL (overrides config and DEVICEIAM_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token for the gateway (overrides config and DEVICEIAM_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List users provisioned on the device
    Users,
    /// List roles available on the device
    Roles,
    /// Add a role to a user
    Grant { user: String, role: String },
    /// Remove a role from a user
    Revoke { user: String, role: String },
    /// Delete a user
    DeleteUser { user: String },
}

fn main() -> ExitCode {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", AppError::Config(e));
            eprintln!("\nSet the device gateway with --url or:");
            eprintln!("  DEVICEIAM_URL=<http(s)://gateway/device>");
            eprintln!("  DEVICEIAM_TOKEN=<access-token>");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_logging(&config.logging.level, cli.verbose);
    info!("Starting deviceiam v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_FAILURE),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(app_error) = e.downcast_ref::<AppError>() {
                eprintln!("{}", app_error.user_message());
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load()?;

    if let Some(url) = &cli.url {
        config.device.url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.device.token = SecureString::from(token.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging.
///
/// Logs go to stderr; stdout is reserved for operation output.
fn init_logging(level: &str, verbose: u8) {
    let filter = match verbose {
        // RUST_LOG has already been folded into the configured level
        0 => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Run the selected command. Returns whether the operation succeeded;
/// a declined confirmation counts as success.
fn run(cli: &Cli, config: &Config) -> Result<bool> {
    let connection = HttpConnection::new(&config.device)
        .map_err(AppError::from)
        .context("Failed to set up device connection")?;

    let prompt: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt::stdio())
    };

    let mut iam = IamClient::new(&connection, prompt, ConsoleReporter::new(cli.json))
        .with_options(config.iam.client_options());

    let result = match &cli.command {
        Command::Users => iam.list_users().map(drop),
        Command::Roles => iam.list_roles().map(drop),
        Command::Grant { user, role } => iam.add_role_to_user(user, role).map(drop),
        Command::Revoke { user, role } => iam.remove_role_from_user(user, role).map(drop),
        Command::DeleteUser { user } => iam.delete_user(user).map(drop),
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) => {
            if let Some(summary) = failure_summary(&e, cli.verbose) {
                eprintln!("{}", summary);
            }
            Ok(false)
        }
    }
}

/// The operation already printed its own lines; `-v` adds a one-line summary.
fn failure_summary(error: &IamError, verbose: u8) -> Option<&str> {
    (verbose > 0).then(|| error.user_message())
}
