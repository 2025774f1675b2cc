//! Strayward - report stray dogs and coordinate their rescue from the terminal.
//!
//! Each subcommand checks the stored session, calls the rescue service and
//! prints the result. Failures are reported as a single `Error:` line.

mod app;
mod commands;
mod format;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strayward_core::config::{Config, API_URL_ENV};

use app::App;
use commands::{AdminCommand, DogsCommand, ProfileCommand};

#[derive(Parser)]
#[command(name = "strayward")]
#[command(about = "Report stray dogs and coordinate their rescue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL or path (overrides config and STRAYWARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and log in
    Signup {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short = 'n', long)]
        full_name: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// View or change your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Browse, report and rescue dogs
    #[command(subcommand)]
    Dogs(DogsCommand),

    /// Administrator tools
    #[command(subcommand)]
    Admin(AdminCommand),
}

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir(config) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "strayward.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn log_dir(config: &Config) -> Option<PathBuf> {
    if !config.log_to_file {
        return None;
    }
    config.cache_dir().ok().map(|dir| dir.join("logs"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load()?
        .with_api_base(std::env::var(API_URL_ENV).ok())
        .with_api_base(cli.api_url.clone());

    let log_guard = init_tracing(&config);
    debug!(api_url = %config.api_url(), "Strayward starting");

    let mut app = App::new(config)?;
    app.session().check_auth().await;

    let outcome = match cli.command {
        Commands::Login { email } => commands::account::login(&mut app, email).await,
        Commands::Signup { email, full_name } => commands::account::signup(&mut app, email, full_name).await,
        Commands::Logout => commands::account::logout(&app).await,
        Commands::Whoami => commands::account::whoami(&app),
        Commands::Profile(command) => commands::account::profile(&app, command).await,
        Commands::Dogs(command) => commands::dogs::run(&app, command).await,
        Commands::Admin(command) => commands::admin::run(&app, command).await,
    };

    Ok(finish(outcome, log_guard))
}

/// Report the command outcome and flush the log file before exiting.
fn finish(outcome: Result<()>, log_guard: Option<WorkerGuard>) -> ExitCode {
    let code = match outcome {
        Ok(()) => {
            info!("Strayward finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    };
    drop(log_guard);
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use strayward_core::models::DogStatus;

    #[test]
    fn test_parse_dog_list_filters() {
        let cli = Cli::try_parse_from([
            "strayward", "dogs", "list", "--status", "pending-admin", "--lat", "44.8", "--lng", "-20.4",
        ])
        .unwrap();
        match cli.command {
            Commands::Dogs(DogsCommand::List { status, lat, lng }) => {
                assert_eq!(status, Some(DogStatus::PendingAdmin));
                assert_eq!(lat, Some(44.8));
                assert_eq!(lng, Some(-20.4));
            }
            _ => panic!("Expected dogs list"),
        }
    }

    #[test]
    fn test_location_filter_needs_both_halves() {
        assert!(Cli::try_parse_from(["strayward", "dogs", "list", "--lat", "44.8"]).is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(Cli::try_parse_from(["strayward", "dogs", "list", "--status", "adopted"]).is_err());
    }

    #[test]
    fn test_global_api_url() {
        let cli = Cli::try_parse_from(["strayward", "whoami", "--api-url", "http://10.0.0.2/api"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2/api"));
    }

    #[test]
    fn test_role_flags_conflict() {
        assert!(Cli::try_parse_from(["strayward", "admin", "role", "7", "--grant", "--revoke"]).is_err());
    }

    #[test]
    fn test_failure_is_flushed_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let appender = tracing_appender::rolling::never(dir.path(), "strayward.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(writer));

        tracing::subscriber::with_default(subscriber, || {
            finish(Err(anyhow::anyhow!("Dog not found")), Some(guard));
        });

        let logged = std::fs::read_to_string(dir.path().join("strayward.log")).unwrap();
        assert!(logged.contains("Command failed"));
        assert!(logged.contains("Dog not found"));
    }
}
