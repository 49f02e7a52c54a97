//! Uniform result envelope returned for every operation.
//!
//! ```json
//! {"status": "created", "data": {"node": {...}}, "message": "Node task-1 created"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BrainError, ErrorKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Created,
    Updated,
    Error,
}

/// Error details attached to `status = "error"` envelopes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub retryable: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl Envelope {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            data: None,
            message: None,
            error: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(Status::Ok)
    }

    pub fn created() -> Self {
        Self::new(Status::Created)
    }

    pub fn updated() -> Self {
        Self::new(Status::Updated)
    }

    /// `created` or `updated` depending on an upsert outcome.
    pub fn upserted(created: bool) -> Self {
        if created {
            Self::created()
        } else {
            Self::updated()
        }
    }

    pub fn error(err: &BrainError) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(err.to_string()),
            error: Some(ErrorInfo {
                kind: err.kind(),
                retryable: err.is_retryable(),
            }),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Render a result, building the success envelope with `on_ok`.
    pub fn from_result<T>(
        result: Result<T, BrainError>,
        on_ok: impl FnOnce(T) -> Envelope,
    ) -> Envelope {
        match result {
            Ok(value) => on_ok(value),
            Err(err) => {
                tracing::debug!(error = %err, kind = ?err.kind(), "Operation failed");
                Envelope::error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let env = Envelope::created()
            .with_data(json!({"node": {"id": "task-1"}}))
            .with_message("Node task-1 created");
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["status"], "created");
        assert_eq!(value["data"]["node"]["id"], "task-1");
        assert_eq!(value["message"], "Node task-1 created");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_envelope_has_no_data() {
        let err = BrainError::StoreUnavailable("connection refused".into());
        let env = Envelope::from_result::<()>(Err(err), |_| Envelope::ok());
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["status"], "error");
        assert!(value.get("data").is_none());
        assert!(value["message"].as_str().unwrap().contains("connection refused"));
        assert_eq!(value["error"]["kind"], "StoreUnavailable");
        assert_eq!(value["error"]["retryable"], true);
    }

    #[test]
    fn upserted_picks_status() {
        assert_eq!(Envelope::upserted(true).status, Status::Created);
        assert_eq!(Envelope::upserted(false).status, Status::Updated);
    }
}
