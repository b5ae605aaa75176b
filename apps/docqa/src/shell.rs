//! Interactive shell. Remote commands run in the background so `cancel` and
//! local views stay responsive; the orchestrator refuses a second remote
//! command while one is running.

use std::{io::Write as _, sync::Arc};

use anyhow::Result;
use client_core::ActionOrchestrator;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    commands::execute,
    input::{parse_shell_line, ShellCommand},
    view,
};

fn prompt() {
    print!("docqa> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(orchestrator: Arc<ActionOrchestrator>) -> Result<()> {
    let _ = orchestrator.refresh().await;
    println!("{}", view::render(&orchestrator.store().snapshot()));
    println!("type 'help' for commands");

    spawn_loading_indicator(&orchestrator);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                if orchestrator.cancel_in_flight() {
                    println!("\ncancelling...");
                    prompt();
                    continue;
                }
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse_shell_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => {
                prompt();
                continue;
            }
            Err(message) => {
                println!("{message}");
                prompt();
                continue;
            }
        };

        if command == ShellCommand::Quit {
            orchestrator.cancel_in_flight();
            break;
        }

        if command.is_remote() {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                match execute(&orchestrator, command).await {
                    Ok(text) => print!("\n{text}"),
                    Err(err) => println!("\n{err:#}"),
                }
                prompt();
            });
        } else {
            match execute(&orchestrator, command).await {
                Ok(text) => print!("{text}"),
                Err(err) => println!("{err:#}"),
            }
            prompt();
        }
    }

    Ok(())
}

/// Logs loading transitions as they are observed on the store.
fn spawn_loading_indicator(orchestrator: &ActionOrchestrator) {
    let mut rx = orchestrator.store().subscribe();
    tokio::spawn(async move {
        let mut was_loading = rx.borrow_and_update().loading;
        while rx.changed().await.is_ok() {
            let loading = rx.borrow_and_update().loading;
            if loading != was_loading {
                debug!(loading, "session loading changed");
                if loading {
                    eprintln!("[working...]");
                }
                was_loading = loading;
            }
        }
        debug!("session store closed");
    });
}
