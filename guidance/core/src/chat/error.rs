//! Chat Errors

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::decoder::DecodeError;

/// Shown when the backend gives no usable error message
pub const GENERIC_STATUS_MESSAGE: &str = "The guidance assistant is unavailable right now";

/// Errors from requesting or streaming a reply
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    /// A reply is already streaming in this session
    #[error("a reply is already in progress")]
    Busy,

    /// The backend answered with a non-success status
    #[error("chat backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the error payload, or a generic one
        message: String,
    },

    /// Connecting or reading the body failed
    #[error("transport error: {0}")]
    Transport(String),

    /// No bytes arrived within the idle limit
    #[error("no data received for {0:?}")]
    IdleTimeout(Duration),

    /// The body could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The reply was cancelled before it finished
    #[error("reply was cancelled")]
    Cancelled,

    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl ChatError {
    /// Build a status error from a response body
    ///
    /// Understands `{"error": {"message": ..}}`, `{"error": ".."}` and
    /// `{"message": ..}`; anything else falls back to a generic message.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                ["/error/message", "/error", "/message"]
                    .iter()
                    .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
                    .map(str::to_string)
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_STATUS_MESSAGE.to_string());
        Self::Status { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_from_nested_error() {
        let err = ChatError::from_status(429, r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#);
        assert_eq!(
            err,
            ChatError::Status {
                status: 429,
                message: "Rate limit reached".to_string()
            }
        );
    }

    #[test]
    fn test_status_message_from_flat_error() {
        let err = ChatError::from_status(400, r#"{"error":"model not found"}"#);
        assert_eq!(err.to_string(), "chat backend returned 400: model not found");
    }

    #[test]
    fn test_status_message_skips_error_object_without_text() {
        let err = ChatError::from_status(
            400,
            r#"{"error":{"code":"bad_request"},"message":"Model llama9 not found"}"#,
        );
        assert_eq!(
            err,
            ChatError::Status {
                status: 400,
                message: "Model llama9 not found".to_string()
            }
        );
    }

    #[test]
    fn test_status_message_fallback() {
        let err = ChatError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(
            err,
            ChatError::Status {
                status: 502,
                message: GENERIC_STATUS_MESSAGE.to_string()
            }
        );
    }
}
