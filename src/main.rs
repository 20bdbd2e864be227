use anyhow::Result;
use clap::{Parser, Subcommand};
use session_gate::app::{run_gate_command, GateCommand};
use session_gate::core::ConfigManager;
use session_gate::role_cli::{handle_role_command, RoleCli};
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "hireloom")]
#[command(about = "HireLoom session, role and job list tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Gate(GateCommand),
    /// Manage the local role store
    Roles(RoleCli),
}

fn init_logging() -> Result<()> {
    let log_path = std::env::var("HIRELOOM_LOG").unwrap_or_else(|_| "/tmp/hireloom.log".into());
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_path, e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = ConfigManager::load()?;
    info!("Environment: {}", config.environment);

    match cli.command {
        Command::Gate(command) => run_gate_command(command, &config).await,
        Command::Roles(roles) => handle_role_command(roles, &config.paths.database_path).await,
    }
}
