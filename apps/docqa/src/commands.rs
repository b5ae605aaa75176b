//! Executes user commands against the orchestrator and renders the outcome.

use std::future::Future;

use anyhow::Result;
use client_core::{ActionError, ActionOrchestrator};

use crate::{
    input::{read_upload_files, ShellCommand, SHELL_HELP},
    view,
};

impl ShellCommand {
    /// Commands that reach the service and may take a while.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Upload(_)
                | Self::Delete(_)
                | Self::Ask(_)
                | Self::ClearHistory
                | Self::Refresh
                | Self::Health
        )
    }
}

/// Runs one command and returns the text to print. Operation failures are
/// recorded in the session error and appear in the rendered view.
pub async fn execute(orchestrator: &ActionOrchestrator, command: ShellCommand) -> Result<String> {
    let store = orchestrator.store();

    let (outcome, show_history) = match command {
        ShellCommand::Files => return Ok(view::render_documents(&store.snapshot())),
        ShellCommand::History => return Ok(view::render_history(&store.snapshot())),
        ShellCommand::Help => return Ok(format!("{SHELL_HELP}\n")),
        ShellCommand::Quit => return Ok(String::new()),
        ShellCommand::Cancel => {
            let text = if orchestrator.cancel_in_flight() {
                "cancelling...\n"
            } else {
                "nothing to cancel\n"
            };
            return Ok(text.to_string());
        }
        ShellCommand::Question(text) => {
            orchestrator.set_question_text(text);
            let snapshot = store.snapshot();
            let mut text = view::render(&snapshot);
            text.push_str(&view::render_ask_hint(&snapshot));
            return Ok(text);
        }
        ShellCommand::Health => {
            let text = match orchestrator.check_health().await {
                Ok(health) if health.is_healthy() => "service is healthy\n".to_string(),
                Ok(health) => format!("service reported status '{}'\n", health.status),
                Err(error) => format!("health check failed: {error}\n"),
            };
            return Ok(text);
        }
        ShellCommand::Upload(paths) => {
            let files = read_upload_files(&paths).await?;
            (orchestrator.upload(files).await.map(drop), false)
        }
        ShellCommand::Delete(filename) => (orchestrator.delete(&filename).await, false),
        ShellCommand::Ask(question) => {
            let outcome = if question.is_empty() {
                orchestrator.ask().await
            } else {
                orchestrator.ask_question(&question).await
            };
            (outcome.map(drop), false)
        }
        ShellCommand::ClearHistory => (orchestrator.clear_history().await, true),
        ShellCommand::Refresh => (orchestrator.refresh().await, true),
    };

    let snapshot = store.snapshot();
    let mut text = match outcome {
        Err(ActionError::Busy) => {
            "another operation is in progress; try again when it finishes\n".to_string()
        }
        Err(ActionError::Cancelled { operation }) => format!("{operation} cancelled\n"),
        _ => String::new(),
    };
    text.push_str(&view::render(&snapshot));
    if show_history {
        text.push_str(&view::render_history(&snapshot));
    }
    Ok(text)
}

/// Drives `operation` to completion; Ctrl-C cancels the in-flight request
/// instead of killing the process.
pub async fn interruptible<F, T>(orchestrator: &ActionOrchestrator, operation: F) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(operation);
    loop {
        tokio::select! {
            result = &mut operation => return result,
            _ = tokio::signal::ctrl_c() => {
                if !orchestrator.cancel_in_flight() {
                    std::process::exit(130);
                }
                eprintln!("cancelling...");
            }
        }
    }
}
