//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility — these types carry the context needed to
//! build meaningful log entries.

use thiserror::Error;

/// Errors that can occur while talking to the chat-completions endpoint.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Failed to parse the completion response body.
    #[error("response parse error: {reason}")]
    ResponseParseError { reason: String },

    /// The model returned a tool call with malformed JSON arguments.
    #[error("tool call parse error for '{tool}': {reason}")]
    ToolCallParseError { tool: String, reason: String },

    /// The model produced neither text nor tool calls.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The tool-calling loop ran out of turns without a final answer.
    #[error("agent loop exhausted after {turns} turns")]
    TurnBudgetExhausted { turns: u32 },

    /// Configuration loading or validation error.
    #[error("config error: {reason}")]
    ConfigError { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_http_status_and_body() {
        let err = InferenceError::HttpError {
            status: 401,
            body: "invalid api key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid api key"));
    }

    #[test]
    fn display_reports_turn_budget() {
        let err = InferenceError::TurnBudgetExhausted { turns: 6 };
        assert!(err.to_string().contains("6 turns"));
    }
}
