//! Text rendering of a session snapshot. Pure: same state, same output.

use std::fmt::Write as _;

use client_core::SessionState;
use shared::domain::QaRecord;

pub fn render(state: &SessionState) -> String {
    let mut out = String::new();
    out.push_str(&render_documents(state));
    out.push_str(&render_answer(state));
    out.push_str(&render_status(state));
    out
}

pub fn render_documents(state: &SessionState) -> String {
    if state.documents.is_empty() {
        return "No documents uploaded.\n".to_string();
    }
    let mut out = format!("Documents ({}):\n", state.documents.len());
    for document in &state.documents {
        let _ = writeln!(out, "  - {}", document.filename);
    }
    out
}

fn render_answer(state: &SessionState) -> String {
    let mut out = String::new();
    if !state.pending_question.is_empty() {
        let _ = writeln!(out, "Question: {}", state.pending_question);
    }
    if !state.last_answer.is_empty() {
        let _ = writeln!(out, "Answer:\n  {}", state.last_answer);
        if !state.last_sources.is_empty() {
            let _ = writeln!(out, "  Sources: {}", state.last_sources.join(", "));
        }
    }
    out
}

pub fn render_status(state: &SessionState) -> String {
    let mut out = String::new();
    if state.loading {
        out.push_str("[working...]\n");
    }
    if !state.error.is_empty() {
        let _ = writeln!(out, "Error: {}", state.error);
    }
    out
}

/// Says whether `ask` would be accepted for the current session.
pub fn render_ask_hint(state: &SessionState) -> String {
    let hint = if state.can_ask() {
        "Type 'ask' to submit the question."
    } else if state.loading {
        "Wait for the current operation to finish before asking."
    } else if !state.has_documents() {
        "Upload a document before asking."
    } else {
        "Enter a question first."
    };
    format!("{hint}\n")
}

pub fn render_history(state: &SessionState) -> String {
    if state.history.is_empty() {
        return "No questions asked yet.\n".to_string();
    }
    let mut out = format!("History ({}):\n", state.history.len());
    for record in &state.history {
        out.push_str(&render_record(record));
    }
    out
}

fn render_record(record: &QaRecord) -> String {
    let mut out = format!(
        "  [{}] Q: {}\n      A: {}\n",
        record.timestamp.format("%Y-%m-%d %H:%M UTC"),
        record.question,
        record.answer
    );
    if !record.source_files.is_empty() {
        let _ = writeln!(out, "      Sources: {}", record.source_files.join(", "));
    }
    out
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
