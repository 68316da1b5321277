//! Data transfer objects for the webhook HTTP surface.

use serde::{Deserialize, Serialize};

/// Minimal error body returned with rejection responses.
///
/// The marketplace only acts on the status code; the body exists for
/// operators reading logs and traces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable reason code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_and_message() {
        let body = ErrorResponse::new("QUANTITY_MISMATCH", "payload 5, marketplace 7");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "QUANTITY_MISMATCH");
        assert_eq!(json["message"], "payload 5, marketplace 7");
    }
}
