//! Analysis tools and the tool registry.
//!
//! Submodules:
//! - `dataset`: CSV loading and the customer-360 merge
//! - `analytics`: the six statistics tools + data summary
//! - `model`: churn forest training / feature importance
//! - `charts`: SVG chart artifacts
//! - `errors`: tool-level error types
//!
//! Every capability implements [`AnalysisTool`]; the registry is the one
//! boundary where string-keyed lookup happens (the LLM names tools by
//! string). Dispatch never propagates a raw fault — errors come back as
//! description text, so the agent always has a result to compose with.

pub mod analytics;
pub mod charts;
pub mod dataset;
pub mod errors;
pub mod model;

pub use dataset::{CustomerRecord, DataStore};
pub use errors::ToolError;

use crate::inference::types::ToolDefinition;

/// A single analytic capability.
///
/// `invoke` takes the model-supplied JSON arguments; most tools ignore them
/// (they operate on the shared dataset), the context tool reads `query`.
pub trait AnalysisTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters, for the LLM tool definitions.
    fn params_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn invoke(&self, args: &serde_json::Value) -> Result<String, ToolError>;
}

/// Fixed mapping from tool name to capability.
pub struct ToolRegistry {
    tools: Vec<Box<dyn AnalysisTool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Box<dyn AnalysisTool>>) -> Self {
        Self { tools }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalysisTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Invoke a tool by name, converting every fault to description text.
    ///
    /// This is the "never fail the caller" boundary: unknown tools and tool
    /// errors both come back as strings the caller can embed in a response.
    pub fn dispatch(&self, name: &str, args: &serde_json::Value) -> String {
        let Some(tool) = self.get(name) else {
            let err = ToolError::UnknownTool {
                name: name.to_string(),
            };
            tracing::warn!(tool = name, "dispatch to unknown tool");
            return err.to_string();
        };

        match tool.invoke(args) {
            Ok(text) => {
                tracing::debug!(tool = name, result_len = text.len(), "tool succeeded");
                text
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool failed");
                e.to_string()
            }
        }
    }

    /// Build the OpenAI tool definition list for the whole registry.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::function(t.name(), t.description(), t.params_schema()))
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
