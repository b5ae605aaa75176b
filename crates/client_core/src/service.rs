//! Remote document/QA service: the trait the orchestrator talks to and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Document, QaRecord},
    error::ErrorBody,
    protocol::{
        AnswerResponse, FileListResponse, HealthResponse, HistoryResponse, FILES_ROUTE,
        HEALTH_ROUTE, HISTORY_ROUTE, QUERY_ROUTE, QUESTION_FIELD, UPLOAD_FILE_FIELD, UPLOAD_ROUTE,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{Operation, ServiceError, ServiceResult},
    settings::{ClientSettings, SettingsError},
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list_files(&self) -> ServiceResult<Vec<Document>>;
    /// Uploads every file in one request; the service accepts or rejects the batch.
    async fn upload_files(&self, files: Vec<UploadFile>) -> ServiceResult<()>;
    async fn delete_file(&self, filename: &str) -> ServiceResult<()>;
    async fn submit_question(&self, question: &str) -> ServiceResult<AnswerResponse>;
    async fn list_history(&self) -> ServiceResult<Vec<QaRecord>>;
    async fn clear_history(&self) -> ServiceResult<()>;
    async fn health(&self) -> ServiceResult<HealthResponse>;
}

pub struct HttpDocumentService {
    http: Client,
    base_url: Url,
}

impl HttpDocumentService {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        Ok(Self::with_client(
            settings.build_http_client()?,
            settings.service_url.clone(),
        ))
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, route: &str, extra: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(route.split('/').filter(|segment| !segment.is_empty()));
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        url
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> ServiceResult<Response> {
        let response = request.send().await.map_err(|error| {
            warn!(operation = %operation, %error, "request to document service failed");
            ServiceError::Network(error.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation = %operation, status = status.as_u16(), "document service responded");
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = ErrorBody::message_from_bytes(&body);
        warn!(
            operation = %operation,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "document service rejected request"
        );
        Err(ServiceError::Service {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> ServiceResult<T> {
        let body = response
            .bytes()
            .await
            .map_err(|error| ServiceError::Network(error.to_string()))?;
        serde_json::from_slice(&body).map_err(|error| {
            warn!(operation = %operation, %error, "undecodable document service response");
            ServiceError::InvalidResponse(error.to_string())
        })
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn list_files(&self) -> ServiceResult<Vec<Document>> {
        let operation = Operation::ListFiles;
        let response = self
            .send(operation, self.http.get(self.endpoint(FILES_ROUTE, None)))
            .await?;
        let body: FileListResponse = Self::decode(operation, response).await?;
        Ok(body.files)
    }

    async fn upload_files(&self, files: Vec<UploadFile>) -> ServiceResult<()> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.filename.clone())
                .mime_str(&file.content_type)
                .map_err(|error| {
                    ServiceError::InvalidRequest(format!(
                        "content type '{}' for '{}': {error}",
                        file.content_type, file.filename
                    ))
                })?;
            form = form.part(UPLOAD_FILE_FIELD, part);
        }

        self.send(
            Operation::Upload,
            self.http
                .post(self.endpoint(UPLOAD_ROUTE, None))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn delete_file(&self, filename: &str) -> ServiceResult<()> {
        self.send(
            Operation::Delete,
            self.http.delete(self.endpoint(FILES_ROUTE, Some(filename))),
        )
        .await?;
        Ok(())
    }

    async fn submit_question(&self, question: &str) -> ServiceResult<AnswerResponse> {
        let operation = Operation::Ask;
        let form = Form::new().text(QUESTION_FIELD, question.to_string());
        let response = self
            .send(
                operation,
                self.http.post(self.endpoint(QUERY_ROUTE, None)).multipart(form),
            )
            .await?;
        Self::decode(operation, response).await
    }

    async fn list_history(&self) -> ServiceResult<Vec<QaRecord>> {
        let operation = Operation::ListHistory;
        let response = self
            .send(operation, self.http.get(self.endpoint(HISTORY_ROUTE, None)))
            .await?;
        let body: HistoryResponse = Self::decode(operation, response).await?;
        Ok(body.history)
    }

    async fn clear_history(&self) -> ServiceResult<()> {
        self.send(
            Operation::ClearHistory,
            self.http.delete(self.endpoint(HISTORY_ROUTE, None)),
        )
        .await?;
        Ok(())
    }

    async fn health(&self) -> ServiceResult<HealthResponse> {
        let operation = Operation::Health;
        let response = self
            .send(operation, self.http.get(self.endpoint(HEALTH_ROUTE, None)))
            .await?;
        Self::decode(operation, response).await
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
