//! Client core for the PDF question-answering service: the remote service
//! client, the session state store, and the action orchestrator that keeps
//! the two consistent.

pub mod error;
pub mod orchestrator;
pub mod service;
pub mod settings;
pub mod store;

pub use error::{ActionError, Operation, ServiceError, ServiceResult};
pub use orchestrator::{ActionOrchestrator, ASK_VALIDATION_MESSAGE, DEFAULT_REQUEST_TIMEOUT};
pub use service::{DocumentService, HttpDocumentService, UploadFile, PDF_CONTENT_TYPE};
pub use settings::{load_settings, ClientSettings, SettingsError};
pub use store::{SessionState, SessionStore};

use std::sync::Arc;

/// Wires an HTTP service client, a fresh store and an orchestrator from settings.
pub fn connect(settings: &ClientSettings) -> Result<Arc<ActionOrchestrator>, SettingsError> {
    let service = HttpDocumentService::from_settings(settings)?;
    let store = Arc::new(SessionStore::new());
    Ok(Arc::new(
        ActionOrchestrator::new(Arc::new(service), store)
            .with_request_timeout(settings.request_timeout),
    ))
}
