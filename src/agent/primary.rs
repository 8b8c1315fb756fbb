//! Primary mode — LLM-driven tool-calling loop.
//!
//! Drives an OpenAI-compatible chat-completions conversation: the model
//! sees the tool catalog, requests tool calls, sees each tool's text
//! output, and iterates until it produces a final text answer or the turn
//! budget runs out. Tool failures are surfaced to the model as text (the
//! registry never errors out of a dispatch), so the model can recover or
//! explain; the loop itself only fails on transport/protocol problems.

use std::sync::Arc;

use crate::inference::{ChatMessage, InferenceClient, InferenceError};
use crate::tools::ToolRegistry;

/// System prompt establishing the analyst persona and tool-use policy.
const SYSTEM_PROMPT: &str =
    "You are an expert Data Analyst Agent for ShopEase. Your goal is to answer \
     business questions by querying the Knowledge Base for context and using the \
     statistical tools for quantitative analysis. Always start by checking the \
     business context if the question implies a 'why' or 'problem'. When a plot \
     is generated, mention the visualization path in your final answer.";

/// LLM-backed agent loop. Constructed only when a usable credential exists.
pub struct LlmAgent {
    client: InferenceClient,
    registry: Arc<ToolRegistry>,
    max_turns: u32,
}

impl LlmAgent {
    pub fn new(client: InferenceClient, registry: Arc<ToolRegistry>, max_turns: u32) -> Self {
        Self {
            client,
            registry,
            max_turns,
        }
    }

    /// Run one query to completion.
    ///
    /// Errors bubble to the caller so the analyst can fall back to the
    /// rule-based planner for this query.
    pub async fn run(&self, query: &str) -> Result<String, InferenceError> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)];
        let tools = self.registry.definitions();

        for turn in 0..self.max_turns {
            let completion = self
                .client
                .chat_completion(messages.clone(), Some(tools.clone()))
                .await?;

            if completion.has_tool_calls() {
                tracing::info!(
                    turn,
                    calls = completion.tool_calls.len(),
                    "model requested tool calls"
                );
                messages.push(ChatMessage::assistant_tool_calls(
                    completion.tool_calls.iter().map(Into::into).collect(),
                ));
                for call in &completion.tool_calls {
                    tracing::info!(tool = %call.name, "dispatching tool call");
                    let output = self.registry.dispatch(&call.name, &call.arguments);
                    messages.push(ChatMessage::tool_result(call.id.clone(), output));
                }
                continue;
            }

            if let Some(content) = completion.content {
                tracing::info!(turn, "model produced final answer");
                return Ok(content);
            }
        }

        Err(InferenceError::TurnBudgetExhausted {
            turns: self.max_turns,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
