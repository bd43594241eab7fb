//! Crate-level error types for the HTTP gateway layer.
//!
//! Every backend failure is reduced to an [`ApiError`] whose Display output is
//! suitable for direct on-screen use. Error-body parsing is best-effort and
//! never fails: see [`ErrorMessage::extract`].

/// How the human-readable message of a failed response was obtained.
///
/// The backend answers some failures with a JSON object carrying a `message`
/// field, others with a bare text body, and transport failures with nothing at
/// all. Consumers that only want a display string can ignore the tag; it is
/// kept so callers can distinguish a server-authored message from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Extracted from a JSON error body's `message` field.
    Parsed,
    /// The raw (non-JSON or message-less) body text.
    Raw,
    /// Nothing usable in the body; a generic message was substituted.
    Generic,
}

/// A normalized, display-ready error message with its extraction provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// How [`text`](ErrorMessage::text) was obtained.
    pub kind: MessageKind,
    /// The display string.
    pub text: String,
}

/// Fallback text used when an error body yields nothing usable.
const GENERIC_FAILURE: &str = "request failed";

impl ErrorMessage {
    /// Extract a display message from an HTTP error body, best-effort.
    ///
    /// Tries, in order: parse the body as JSON and read a string `message`
    /// field; use the raw body text; substitute a generic message. This
    /// function cannot fail -- a parse failure only degrades the result to a
    /// less specific tier.
    ///
    /// # Arguments
    ///
    /// * `body` - The response body text, possibly empty.
    pub fn extract(body: &str) -> Self {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
            && let Some(message) = value.get("message").and_then(|m| m.as_str())
        {
            return Self {
                kind: MessageKind::Parsed,
                text: message.to_string(),
            };
        }

        let trimmed = body.trim();
        if !trimmed.is_empty() {
            return Self {
                kind: MessageKind::Raw,
                text: trimmed.to_string(),
            };
        }

        Self {
            kind: MessageKind::Generic,
            text: GENERIC_FAILURE.to_string(),
        }
    }

    /// Build a generic message for failures that produced no body at all.
    pub fn generic() -> Self {
        Self {
            kind: MessageKind::Generic,
            text: GENERIC_FAILURE.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Error returned by every gateway service call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was obtained (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a 4xx/5xx status.
    ///
    /// `message` is the normalized body extraction; Display renders the
    /// status code alongside it so a bare `to_string()` is screen-ready.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Best-effort extracted display message.
        message: ErrorMessage,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The display string a view should show the user for this failure.
    ///
    /// Status errors surface the extracted message without the status-code
    /// prefix; other variants use their Display output.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.text.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- ErrorMessage extraction tests ---

    #[test]
    fn extract_reads_json_message_field() {
        let msg = ErrorMessage::extract(r#"{"message": "Zone not found", "status": 404}"#);
        assert_eq!(msg.kind, MessageKind::Parsed);
        assert_eq!(msg.text, "Zone not found");
    }

    #[test]
    fn extract_falls_back_to_raw_body_for_plain_text() {
        let msg = ErrorMessage::extract("Stock quantity exceeds zone capacity");
        assert_eq!(msg.kind, MessageKind::Raw);
        assert_eq!(msg.text, "Stock quantity exceeds zone capacity");
    }

    #[test]
    fn extract_falls_back_to_raw_for_json_without_message() {
        // Valid JSON but no "message" field: the raw body is still the most
        // specific thing we have.
        let msg = ErrorMessage::extract(r#"{"error": "boom"}"#);
        assert_eq!(msg.kind, MessageKind::Raw);
        assert_eq!(msg.text, r#"{"error": "boom"}"#);
    }

    #[test]
    fn extract_non_string_message_degrades_to_raw() {
        let msg = ErrorMessage::extract(r#"{"message": 42}"#);
        assert_eq!(msg.kind, MessageKind::Raw);
    }

    #[test]
    fn extract_empty_body_degrades_to_generic() {
        let msg = ErrorMessage::extract("");
        assert_eq!(msg.kind, MessageKind::Generic);
        assert_eq!(msg.text, "request failed");

        let msg = ErrorMessage::extract("   \n ");
        assert_eq!(msg.kind, MessageKind::Generic);
    }

    // --- ApiError tests ---

    #[test]
    fn status_error_display_includes_code_and_message() {
        let err = ApiError::Status {
            status: 404,
            message: ErrorMessage::extract(r#"{"message": "Vendor not found"}"#),
        };
        assert_eq!(err.to_string(), "HTTP 404: Vendor not found");
    }

    #[test]
    fn display_message_strips_status_prefix() {
        let err = ApiError::Status {
            status: 500,
            message: ErrorMessage::generic(),
        };
        assert_eq!(err.display_message(), "request failed");
    }

    #[test]
    fn decode_error_from_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err = ApiError::from(json_err);
        assert!(err.to_string().starts_with("malformed response body"));
    }

    // Verify `Send + Sync` bounds are satisfied so errors can cross task
    // boundaries in spawned fetch tasks.
    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<ApiError>();
        }
    };
}
