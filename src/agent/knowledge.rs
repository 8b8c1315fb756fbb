//! Qualitative knowledge base.
//!
//! Holds a small fixed set of business context documents and retrieves the
//! subset relevant to a query via keyword matching — a stand-in for semantic
//! search at demo scale. Retrieval is a pure function of the query text:
//! no I/O, no state, no failure mode.

use std::sync::Arc;

use crate::tools::{AnalysisTool, ToolError};

const BACKGROUND: &str = "ShopEase is a mid-size E-commerce Platform in India operating \
     D2C + Marketplace models. Categories: Electronics, Fashion, Home & Kitchen, Beauty.";

const PROBLEM: &str = "Leadership is concerned about increasing customer churn and \
     declining repeat purchase rates, particularly from paid channels.";

const HYPOTHESES: &str = "Leadership suspects poor delivery experience, discount \
     dependency, and low post-purchase engagement are contributing factors.";

const CONSTRAINTS: &str = "Marketing budget is capped. Heavy discounting is discouraged. \
     Focus on operational or engagement improvements.";

/// Fixed-document knowledge base with keyword retrieval.
#[derive(Debug, Default)]
pub struct KnowledgeBase;

impl KnowledgeBase {
    pub fn new() -> Self {
        Self
    }

    /// Retrieve the documents relevant to `query`, concatenated in rule order.
    ///
    /// Rules are evaluated independently (not first-match): a query can pull
    /// several documents. When nothing matches, the background document is
    /// returned alone.
    pub fn retrieve(&self, query: &str) -> String {
        let q = query.to_lowercase();
        let mut docs: Vec<&str> = Vec::new();

        if q.contains("churn") || q.contains("problem") {
            docs.push(PROBLEM);
        }
        if q.contains("delivery") || q.contains("discount") || q.contains("suspect") {
            docs.push(HYPOTHESES);
        }
        if q.contains("budget") || q.contains("cost") {
            docs.push(CONSTRAINTS);
        }

        if docs.is_empty() {
            docs.push(BACKGROUND);
        }

        docs.join("\n")
    }
}

/// The knowledge base exposed as a registry tool.
///
/// Unlike the statistics tools this one takes an argument: the model (or the
/// planner) passes the query text it wants context for.
pub struct ContextTool {
    kb: Arc<KnowledgeBase>,
}

impl ContextTool {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }
}

impl AnalysisTool for ContextTool {
    fn name(&self) -> &'static str {
        "get_business_context"
    }

    fn description(&self) -> &'static str {
        "Retrieves qualitative business context, history, and hypotheses from company \
         documents. Use this to understand 'Why' something is happening or what the \
         business suspects."
    }

    fn params_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question to retrieve business context for."
                }
            },
            "required": ["query"]
        })
    }

    fn invoke(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");
        Ok(self.kb.retrieve(query))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
