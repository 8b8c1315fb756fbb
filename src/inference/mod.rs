//! Inference layer — OpenAI-compatible API client for Primary mode.
//!
//! This module handles all communication with the chat-completions endpoint:
//! - Non-streaming completion requests with tool definitions
//! - Native JSON tool call parsing
//! - Agent configuration loading (`shopease.yaml`) and credential resolution
//!
//! The client speaks the OpenAI Chat Completions API, so the backing model
//! is interchangeable via config rather than code.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::InferenceClient;
pub use config::{AgentConfig, API_KEY_ENV};
pub use errors::InferenceError;
pub use types::{ChatMessage, CompletionTurn, Role, ToolCall, ToolDefinition};
