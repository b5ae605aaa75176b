//! Session state store: the single source of truth the presentation layer renders.

use shared::domain::{Document, QaRecord};
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub documents: Vec<Document>,
    /// Newest first.
    pub history: Vec<QaRecord>,
    pub pending_question: String,
    pub last_answer: String,
    pub last_sources: Vec<String>,
    pub loading: bool,
    pub error: String,
}

impl SessionState {
    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn has_document(&self, filename: &str) -> bool {
        self.documents
            .iter()
            .any(|document| document.filename == filename)
    }

    /// Whether the ask control should be enabled.
    pub fn can_ask(&self) -> bool {
        !self.loading && self.has_documents() && !self.pending_question.trim().is_empty()
    }
}

/// Holds the session state and notifies subscribers on every change.
///
/// Setters are crate-private so that only the orchestrator mutates state.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub(crate) fn set_documents(&self, documents: Vec<Document>) {
        self.state.send_modify(|state| state.documents = documents);
    }

    pub(crate) fn set_history(&self, mut history: Vec<QaRecord>) {
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.state.send_modify(|state| state.history = history);
    }

    pub(crate) fn set_question_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.pending_question = text);
    }

    pub(crate) fn set_answer(&self, answer: impl Into<String>, sources: Vec<String>) {
        let answer = answer.into();
        self.state.send_modify(|state| {
            state.last_answer = answer;
            state.last_sources = sources;
        });
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub(crate) fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.state.send_modify(|state| state.error = error);
    }

    /// Records a validation error unless an operation is running.
    pub(crate) fn set_error_if_idle(&self, error: impl Into<String>) -> bool {
        let error = error.into();
        self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.error = error;
            true
        })
    }

    /// Marks an operation as started: `loading=true` and `error` cleared.
    ///
    /// Returns false, leaving state untouched, when one is already running.
    pub(crate) fn try_begin_operation(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error.clear();
            true
        })
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
