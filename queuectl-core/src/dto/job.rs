//! Job DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured enqueue payload
///
/// `command` is the only required field; everything else falls back to
/// store-side defaults (`max_retries` from config, timestamps = now,
/// generated id). A missing `command` fails JSON parsing, which callers
/// surface as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    pub command: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub max_retries: Option<i64>,
    #[serde(default)]
    pub attempts: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl JobPayload {
    /// Payload with only a command, everything else defaulted
    pub fn new(command: impl Into<String>) -> Self {
        JobPayload {
            command: command.into(),
            id: None,
            max_retries: None,
            attempts: 0,
            created_at: None,
            updated_at: None,
            last_error: None,
        }
    }

    /// Parses a payload from a JSON document
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_parses() {
        let payload = JobPayload::from_json(r#"{"command": "echo hi"}"#).unwrap();
        assert_eq!(payload.command, "echo hi");
        assert_eq!(payload.attempts, 0);
        assert!(payload.id.is_none());
        assert!(payload.max_retries.is_none());
    }

    #[test]
    fn missing_command_is_a_parse_error() {
        assert!(JobPayload::from_json(r#"{"id": "job-1"}"#).is_err());
    }

    #[test]
    fn full_payload_parses() {
        let payload = JobPayload::from_json(
            r#"{"command": "true", "id": "job-1", "max_retries": 5, "attempts": 2}"#,
        )
        .unwrap();
        assert_eq!(payload.id.as_deref(), Some("job-1"));
        assert_eq!(payload.max_retries, Some(5));
        assert_eq!(payload.attempts, 2);
    }
}
