//! Action orchestrator: one operation per user intent.
//!
//! Each operation walks validate → in flight → reconcile → idle. Mutations are
//! never applied locally; the affected lists are refetched from the service
//! once the mutating call succeeds. At most one operation runs at a time, and
//! the `loading` flag is released by [`OperationGuard`] on every exit path.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::protocol::{AnswerResponse, HealthResponse};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::{ActionError, Operation, ServiceResult},
    service::{DocumentService, UploadFile},
    store::SessionStore,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const ASK_VALIDATION_MESSAGE: &str = "Please enter a question";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationPhase {
    Validating,
    InFlight,
    Reconciling,
    Idle,
}

pub struct ActionOrchestrator {
    service: Arc<dyn DocumentService>,
    store: Arc<SessionStore>,
    request_timeout: Duration,
    in_flight: Mutex<Option<CancellationToken>>,
}

struct OperationGuard<'a> {
    orchestrator: &'a ActionOrchestrator,
    operation: Operation,
    token: CancellationToken,
}

impl OperationGuard<'_> {
    fn enter(&self, phase: OperationPhase) {
        debug!(operation = %self.operation, ?phase, "operation phase");
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.lock_in_flight().take();
        self.orchestrator.store.set_loading(false);
        debug!(operation = %self.operation, phase = ?OperationPhase::Idle, "operation settled");
    }
}

impl ActionOrchestrator {
    pub fn new(service: Arc<dyn DocumentService>, store: Arc<SessionStore>) -> Self {
        Self {
            service,
            store,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            in_flight: Mutex::new(None),
        }
    }

    /// Bounds every remote call an operation issues.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Cancels the running operation, if any. Returns whether one was running.
    pub fn cancel_in_flight(&self) -> bool {
        match self.lock_in_flight().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Echoes the question form input into the session.
    pub fn set_question_text(&self, text: impl Into<String>) {
        self.store.set_question_text(text);
    }

    /// Uploads all selected files in one batch, then refetches the file list.
    ///
    /// Returns the number of files sent; an empty selection is a no-op.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<usize, ActionError> {
        if files.is_empty() {
            debug!(operation = %Operation::Upload, "no files selected; nothing to upload");
            return Ok(0);
        }
        self.ensure_idle(Operation::Upload)?;

        let guard = self.begin(Operation::Upload)?;
        let count = files.len();
        let result = async {
            self.call(&guard, Operation::Upload, self.service.upload_files(files))
                .await?;
            guard.enter(OperationPhase::Reconciling);
            let documents = self
                .call(&guard, Operation::ListFiles, self.service.list_files())
                .await?;
            self.store.set_documents(documents);
            Ok::<_, ActionError>(count)
        }
        .await;
        self.settle(guard, result)
    }

    pub async fn delete(&self, filename: &str) -> Result<(), ActionError> {
        self.ensure_idle(Operation::Delete)?;
        debug!(
            operation = %Operation::Delete,
            phase = ?OperationPhase::Validating,
            filename,
            "operation phase"
        );
        if !self.store.snapshot().has_document(filename) {
            debug!(
                operation = %Operation::Delete,
                filename,
                "file not in cached document list; deferring to the service"
            );
        }

        let guard = self.begin(Operation::Delete)?;
        let result = async {
            self.call(&guard, Operation::Delete, self.service.delete_file(filename))
                .await?;
            guard.enter(OperationPhase::Reconciling);
            let documents = self
                .call(&guard, Operation::ListFiles, self.service.list_files())
                .await?;
            self.store.set_documents(documents);
            Ok::<_, ActionError>(())
        }
        .await;
        self.settle(guard, result)
    }

    /// Sets the question text and submits it.
    pub async fn ask_question(&self, question: &str) -> Result<AnswerResponse, ActionError> {
        self.ensure_idle(Operation::Ask)?;
        self.set_question_text(question);
        self.ask().await
    }

    /// Submits the pending question. The answer lands in the session before
    /// the history refetch is issued.
    pub async fn ask(&self) -> Result<AnswerResponse, ActionError> {
        self.ensure_idle(Operation::Ask)?;
        let snapshot = self.store.snapshot();
        let question = snapshot.pending_question.trim().to_string();
        debug!(operation = %Operation::Ask, phase = ?OperationPhase::Validating, "operation phase");
        if question.is_empty() || !snapshot.has_documents() {
            return Err(self.reject(Operation::Ask, ASK_VALIDATION_MESSAGE));
        }

        let guard = self.begin(Operation::Ask)?;
        self.store.set_answer(String::new(), Vec::new());
        let result = async {
            let response = self
                .call(&guard, Operation::Ask, self.service.submit_question(&question))
                .await?;
            self.store
                .set_answer(response.answer.clone(), response.sources.clone());
            guard.enter(OperationPhase::Reconciling);
            let history = self
                .call(&guard, Operation::ListHistory, self.service.list_history())
                .await?;
            self.store.set_history(history);
            Ok::<_, ActionError>(response)
        }
        .await;
        self.settle(guard, result)
    }

    /// Clears the history on the service. Nothing is refetched; the
    /// collection is known to be empty afterwards.
    pub async fn clear_history(&self) -> Result<(), ActionError> {
        self.ensure_idle(Operation::ClearHistory)?;
        let guard = self.begin(Operation::ClearHistory)?;
        let result = self
            .call(&guard, Operation::ClearHistory, self.service.clear_history())
            .await
            .map(|()| {
                guard.enter(OperationPhase::Reconciling);
                self.store.set_history(Vec::new());
            });
        self.settle(guard, result)
    }

    /// Refetches files and history together. Whichever half succeeds is
    /// applied even when the other fails.
    pub async fn refresh(&self) -> Result<(), ActionError> {
        self.ensure_idle(Operation::Refresh)?;
        let guard = self.begin(Operation::Refresh)?;
        let (files, history) = tokio::join!(
            self.call(&guard, Operation::ListFiles, self.service.list_files()),
            self.call(&guard, Operation::ListHistory, self.service.list_history()),
        );
        guard.enter(OperationPhase::Reconciling);

        let mut first_error = None;
        match files {
            Ok(documents) => self.store.set_documents(documents),
            Err(error) => first_error = Some(error),
        }
        match history {
            Ok(records) => self.store.set_history(records),
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }

        let result = match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        };
        self.settle(guard, result)
    }

    /// Probes the service. This does not touch session state.
    pub async fn check_health(&self) -> Result<HealthResponse, ActionError> {
        let operation = Operation::Health;
        match tokio::time::timeout(self.request_timeout, self.service.health()).await {
            Ok(result) => result.map_err(|source| ActionError::Remote { operation, source }),
            Err(_) => Err(ActionError::TimedOut {
                operation,
                after: self.request_timeout,
            }),
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_idle(&self, operation: Operation) -> Result<(), ActionError> {
        if self.store.is_loading() {
            warn!(operation = %operation, "rejected: another operation is in progress");
            return Err(ActionError::Busy);
        }
        Ok(())
    }

    fn reject(&self, operation: Operation, message: impl Into<String>) -> ActionError {
        let message = message.into();
        if !self.store.set_error_if_idle(message.clone()) {
            warn!(operation = %operation, "rejected: another operation is in progress");
            return ActionError::Busy;
        }
        info!(operation = %operation, %message, "operation failed validation");
        ActionError::Validation(message)
    }

    fn begin(&self, operation: Operation) -> Result<OperationGuard<'_>, ActionError> {
        let token = CancellationToken::new();
        {
            let mut in_flight = self.lock_in_flight();
            if !self.store.try_begin_operation() {
                warn!(operation = %operation, "rejected: another operation is in progress");
                return Err(ActionError::Busy);
            }
            *in_flight = Some(token.clone());
        }
        info!(operation = %operation, "operation started");
        let guard = OperationGuard {
            orchestrator: self,
            operation,
            token,
        };
        guard.enter(OperationPhase::InFlight);
        Ok(guard)
    }

    async fn call<T, F>(
        &self,
        guard: &OperationGuard<'_>,
        operation: Operation,
        request: F,
    ) -> Result<T, ActionError>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        tokio::select! {
            _ = guard.token.cancelled() => Err(ActionError::Cancelled { operation }),
            outcome = tokio::time::timeout(self.request_timeout, request) => match outcome {
                Ok(result) => result.map_err(|source| ActionError::Remote { operation, source }),
                Err(_) => Err(ActionError::TimedOut {
                    operation,
                    after: self.request_timeout,
                }),
            },
        }
    }

    fn settle<T>(
        &self,
        guard: OperationGuard<'_>,
        result: Result<T, ActionError>,
    ) -> Result<T, ActionError> {
        match &result {
            Ok(_) => info!(operation = %guard.operation, "operation completed"),
            Err(error) => {
                warn!(operation = %guard.operation, %error, "operation failed");
                if let Some(message) = error.user_message() {
                    self.store.set_error(message);
                }
            }
        }
        drop(guard);
        result
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
