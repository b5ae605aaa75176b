use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the service on a non-success status.
///
/// The service reports failures as `{"detail": "..."}`; `{"message": "..."}`
/// is accepted as well. A `detail` that is not a string (request validation
/// arrays) carries no user-facing message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn user_message(&self) -> Option<String> {
        let from_detail = match &self.detail {
            Some(Value::String(text)) => Some(text.as_str()),
            _ => None,
        };
        from_detail
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// Extracts the user-facing message from a raw response body, if any.
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_string_detail() {
        let body = br#"{"detail":"disk full","message":"ignored"}"#;
        assert_eq!(ErrorBody::message_from_bytes(body).as_deref(), Some("disk full"));
    }

    #[test]
    fn falls_back_to_message_field() {
        let body = br#"{"message":"file not found"}"#;
        assert_eq!(
            ErrorBody::message_from_bytes(body).as_deref(),
            Some("file not found")
        );
    }

    #[test]
    fn validation_array_detail_has_no_message() {
        let body = br#"{"detail":[{"loc":["body","question"],"msg":"field required"}]}"#;
        assert_eq!(ErrorBody::message_from_bytes(body), None);
    }

    #[test]
    fn blank_or_non_json_bodies_have_no_message() {
        assert_eq!(ErrorBody::message_from_bytes(br#"{"detail":"  "}"#), None);
        assert_eq!(ErrorBody::message_from_bytes(b"Internal Server Error"), None);
        assert_eq!(ErrorBody::message_from_bytes(b""), None);
    }
}
