use serde::{Deserialize, Serialize};

use crate::domain::{Document, QaRecord};

pub const FILES_ROUTE: &str = "/files";
pub const UPLOAD_ROUTE: &str = "/upload";
pub const QUERY_ROUTE: &str = "/query";
pub const HISTORY_ROUTE: &str = "/history";
pub const HEALTH_ROUTE: &str = "/health";

/// Multipart part name carrying each uploaded file.
pub const UPLOAD_FILE_FIELD: &str = "files";
/// Multipart text field carrying the question.
pub const QUESTION_FIELD: &str = "question";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<QaRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
