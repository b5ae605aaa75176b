//! User input: PDF selection from disk and the interactive shell grammar.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use client_core::UploadFile;

/// Returns the file name to upload under, rejecting anything that is not a `.pdf`.
pub fn pdf_filename(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("'{}' is not a PDF file", path.display());
    }
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    Ok(filename)
}

/// Reads every selected file. Any unreadable or non-PDF path fails the whole selection.
pub async fn read_upload_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let filename = pdf_filename(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        files.push(UploadFile::pdf(filename, bytes));
    }
    Ok(files)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Files,
    Upload(Vec<PathBuf>),
    Delete(String),
    /// Sets the question text without submitting it.
    Question(String),
    /// Submits the given question, or the pending one when empty.
    Ask(String),
    History,
    ClearHistory,
    Refresh,
    Health,
    Cancel,
    Help,
    Quit,
}

pub const SHELL_HELP: &str = "\
commands:
  files                   list uploaded documents
  upload <path.pdf>...    upload one or more PDFs in a single batch
  delete <filename>       delete an uploaded document
  question <text>         set the question without sending it
  ask [text]              ask the given (or pending) question
  history                 show previous questions and answers
  clear-history           delete all history
  refresh                 reload documents and history
  health                  check the service
  cancel                  cancel the running operation
  help                    show this help
  quit                    leave the shell";

/// Parses one shell line. Blank lines yield `Ok(None)`.
pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "files" | "ls" => ShellCommand::Files,
        "upload" => {
            if rest.is_empty() {
                return Err("usage: upload <path.pdf>...".to_string());
            }
            ShellCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete <filename>".to_string());
            }
            ShellCommand::Delete(rest.to_string())
        }
        "question" => ShellCommand::Question(rest.to_string()),
        "ask" => ShellCommand::Ask(rest.to_string()),
        "history" => ShellCommand::History,
        "clear-history" => ShellCommand::ClearHistory,
        "refresh" => ShellCommand::Refresh,
        "health" => ShellCommand::Health,
        "cancel" => ShellCommand::Cancel,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}
