use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(RecordId);

/// A document held by the remote store. The filename is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

/// One answered question, as recorded by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source_files: Vec<String>,
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an RFC 3339 timestamp, or a naive one that is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_naive_timestamps_as_utc() {
        let with_t = parse_timestamp("2024-05-01T10:00:00.123456").expect("iso naive");
        let with_space = parse_timestamp("2024-05-01 10:00:00.123456").expect("space naive");
        assert_eq!(with_t, with_space);
        assert_eq!(with_t.hour(), 10);
        assert_eq!(with_t.day(), 1);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-05-01T12:00:00+02:00").expect("rfc3339");
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn record_decodes_service_history_entry() {
        let record: QaRecord = serde_json::from_value(serde_json::json!({
            "id": "4b7d",
            "question": "What is X?",
            "answer": "X is Y",
            "timestamp": "2024-05-01T10:00:00",
            "source_files": ["doc1.pdf"]
        }))
        .expect("record");
        assert_eq!(record.id.as_str(), "4b7d");
        assert_eq!(record.source_files, vec!["doc1.pdf".to_string()]);
        assert_eq!(record.timestamp.year(), 2024);
    }
}
