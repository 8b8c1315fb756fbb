//! Shared types for the inference client.
//!
//! These mirror the OpenAI Chat Completions API, used for both request
//! building and response parsing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InferenceError;

// ─── Request Types ──────────────────────────────────────────────────────────

/// A single message in the conversation.
///
/// Serialization note: `content` is emitted as `""` (not `null`) for assistant
/// messages that only carry tool calls. Several OpenAI-compatible backends
/// mishandle `null` content in the tool round-trip pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(serialize_with = "serialize_content")]
    pub content: Option<String>,
    /// Tool results are sent back as `tool` role messages carrying this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Assistant messages may contain tool calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallResponse>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// An assistant message that echoes the model's tool calls back to it.
    pub fn assistant_tool_calls(calls: Vec<ToolCallResponse>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_call_id: None,
            tool_calls: Some(calls),
        }
    }

    /// A tool-result message for a specific tool call id.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }
}

/// Emit `""` instead of `null` when content is `None`.
fn serialize_content<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(s) => serializer.serialize_str(s),
        None => serializer.serialize_str(""),
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool definition sent in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    /// Build a `function`-type tool definition.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

// ─── Response Types ─────────────────────────────────────────────────────────

/// A parsed tool call extracted from the model's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for this call (generated if the model doesn't provide one).
    pub id: String,
    /// Tool name, e.g. `"analyze_delivery_impact"`.
    pub name: String,
    /// Validated JSON arguments.
    pub arguments: serde_json::Value,
}

/// Tool call as echoed back in the OpenAI response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResponse {
    pub id: String,
    pub r#type: String,
    pub function: FunctionCallResponse,
}

/// Function call details in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallResponse {
    pub name: String,
    /// Arguments as the raw JSON string the API uses on the wire.
    pub arguments: String,
}

impl From<&ToolCall> for ToolCallResponse {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            r#type: "function".to_string(),
            function: FunctionCallResponse {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

/// The model's turn, after parsing: either a final text answer or tool calls.
#[derive(Debug, Clone)]
pub struct CompletionTurn {
    /// Final answer text, if the model produced one.
    pub content: Option<String>,
    /// Tool calls requested by the model, if any.
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionTurn {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ─── Response parsing ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Deserialize)]
struct RawToolCall {
    id: Option<String>,
    function: RawFunctionCall,
}

#[derive(Deserialize)]
struct RawFunctionCall {
    name: String,
    arguments: String,
}

/// Parse a non-streaming chat-completion body into a [`CompletionTurn`].
pub fn parse_completion_response(body: &str) -> Result<CompletionTurn, InferenceError> {
    let resp: CompletionResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::ResponseParseError {
            reason: format!("failed to parse completion body: {e}"),
        })?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or(InferenceError::ResponseParseError {
            reason: "empty choices array".into(),
        })?;

    let content = choice.message.content.filter(|c| !c.is_empty());

    let mut tool_calls = Vec::new();
    if let Some(raw_calls) = choice.message.tool_calls {
        for raw in raw_calls {
            let id = raw
                .id
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4()));
            let arguments: serde_json::Value = serde_json::from_str(&raw.function.arguments)
                .map_err(|e| InferenceError::ToolCallParseError {
                    tool: raw.function.name.clone(),
                    reason: format!("invalid JSON arguments: {e}"),
                })?;
            tool_calls.push(ToolCall {
                id,
                name: raw.function.name,
                arguments,
            });
        }
    }

    if content.is_none() && tool_calls.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    Ok(CompletionTurn {
        content,
        tool_calls,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_answer() {
        let body = r#"{
            "choices": [{
                "message": {"role": "assistant", "content": "Churn is 24%."},
                "finish_reason": "stop"
            }]
        }"#;
        let turn = parse_completion_response(body).unwrap();
        assert_eq!(turn.content.as_deref(), Some("Churn is 24%."));
        assert!(!turn.has_tool_calls());
    }

    #[test]
    fn parse_tool_call_with_string_arguments() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_business_context",
                            "arguments": "{\"query\": \"why churn\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let turn = parse_completion_response(body).unwrap();
        assert!(turn.has_tool_calls());
        assert_eq!(turn.tool_calls[0].name, "get_business_context");
        assert_eq!(turn.tool_calls[0].arguments["query"], "why churn");
    }

    #[test]
    fn parse_tool_call_without_id_generates_one() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "type": "function",
                        "function": {"name": "get_data_summary", "arguments": "{}"}
                    }]
                }
            }]
        }"#;
        let turn = parse_completion_response(body).unwrap();
        assert!(turn.tool_calls[0].id.starts_with("call_"));
    }

    #[test]
    fn parse_malformed_arguments_is_an_error() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_data_summary", "arguments": "{broken"}
                    }]
                }
            }]
        }"#;
        let err = parse_completion_response(body).unwrap_err();
        assert!(matches!(err, InferenceError::ToolCallParseError { .. }));
    }

    #[test]
    fn parse_empty_message_is_an_error() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": ""}}]}"#;
        let err = parse_completion_response(body).unwrap_err();
        assert!(matches!(err, InferenceError::EmptyResponse));
    }

    #[test]
    fn assistant_tool_call_message_serializes_empty_content() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_data_summary".into(),
            arguments: serde_json::json!({}),
        };
        let msg = ChatMessage::assistant_tool_calls(vec![(&call).into()]);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"content\":\"\""), "content must be \"\", not null");
        assert!(json.contains("get_data_summary"));
    }

    #[test]
    fn tool_result_message_carries_call_id() {
        let msg = ChatMessage::tool_result("call_7", "Summary: 500 Customers");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"tool_call_id\":\"call_7\""));
        assert!(json.contains("\"role\":\"tool\""));
    }
}
