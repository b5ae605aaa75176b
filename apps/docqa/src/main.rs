use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, ClientSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod shell;
mod view;

use commands::{execute, interruptible};
use input::ShellCommand;

#[derive(Parser, Debug)]
#[command(name = "docqa", about = "Upload PDFs and ask questions about them")]
struct Cli {
    /// Settings file; defaults to ./docqa.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    service_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded documents.
    Files,
    /// Upload one or more PDFs in a single batch.
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete an uploaded document.
    Delete { filename: String },
    /// Ask a question about the uploaded documents.
    Ask { question: String },
    /// Show previous questions and answers.
    History,
    /// Delete all question/answer history.
    ClearHistory,
    /// Check that the service is reachable.
    Health,
    /// Start an interactive session (the default).
    Shell,
}

impl Command {
    fn into_shell_command(self) -> Option<ShellCommand> {
        let command = match self {
            Self::Files => ShellCommand::Files,
            Self::Upload { paths } => ShellCommand::Upload(paths),
            Self::Delete { filename } => ShellCommand::Delete(filename),
            Self::Ask { question } => ShellCommand::Ask(question),
            Self::History => ShellCommand::History,
            Self::ClearHistory => ShellCommand::ClearHistory,
            Self::Health => ShellCommand::Health,
            Self::Shell => return None,
        };
        Some(command)
    }
}

fn resolve_settings(cli: &Cli) -> Result<ClientSettings> {
    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(url) = &cli.service_url {
        settings = settings.with_service_url(url)?;
    }
    if let Some(secs) = cli.timeout_secs {
        settings = settings.with_request_timeout_secs(secs)?;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(service_url = %settings.service_url, "using document service");
    let orchestrator = client_core::connect(&settings).context("failed to set up service client")?;

    let Some(command) = cli.command.and_then(Command::into_shell_command) else {
        shell::run(orchestrator).await?;
        return Ok(ExitCode::SUCCESS);
    };

    if command != ShellCommand::Health {
        // Load the session the way a fresh page would before acting on it.
        if interruptible(&orchestrator, orchestrator.refresh()).await.is_err() {
            print!("{}", view::render(&orchestrator.store().snapshot()));
            return Ok(ExitCode::FAILURE);
        }
    }

    let text = interruptible(&orchestrator, execute(&orchestrator, command)).await?;
    print!("{text}");

    if orchestrator.store().snapshot().error.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
