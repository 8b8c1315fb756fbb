//! Rule-based planner — Fallback mode.
//!
//! Simulates the agent's reasoning without an LLM: keyword intent
//! classification over the lowered query, exactly one tool call per intent,
//! and a fixed response template. The knowledge base is always consulted
//! first; the retrieved context is logged for diagnostics but not injected
//! into the composed response (the Primary-mode model does its own lookup).
//!
//! The planner never fails: tool-level errors arrive as description strings
//! from the registry and are embedded in the response body.

use std::sync::Arc;

use crate::agent::knowledge::KnowledgeBase;
use crate::tools::analytics::Analysis;
use crate::tools::ToolRegistry;

/// Fixed recommendation footer appended to every fallback response.
const RECOMMENDATION: &str =
    "Please investigate the highlighted metrics above, specifically targeting \
     high-churn segments.";

/// Query intent, classified from keyword presence.
///
/// The classification rules are ordered — the first matching rule wins —
/// and `Summary` is the unconditional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Delivery,
    Channel,
    CityRegion,
    Demographics,
    Engagement,
    PredictiveModel,
    Summary,
}

impl Intent {
    /// Classify a query. Case-insensitive substring matching, fixed
    /// precedence, first match short-circuits.
    pub fn classify(query: &str) -> Intent {
        let q = query.to_lowercase();
        if q.contains("delivery") {
            Intent::Delivery
        } else if q.contains("channel") {
            Intent::Channel
        } else if q.contains("city") || q.contains("region") {
            Intent::CityRegion
        } else if q.contains("gender") || q.contains("demograph") {
            Intent::Demographics
        } else if q.contains("visit") || q.contains("engage") {
            Intent::Engagement
        } else if q.contains("model") || q.contains("predict") || q.contains("driver") {
            Intent::PredictiveModel
        } else {
            Intent::Summary
        }
    }

    /// The single analysis each intent dispatches to.
    pub fn analysis(self) -> Analysis {
        match self {
            Intent::Delivery => Analysis::DeliveryImpact,
            Intent::Channel => Analysis::ChannelPerformance,
            Intent::CityRegion => Analysis::CityPerformance,
            Intent::Demographics => Analysis::Demographics,
            Intent::Engagement => Analysis::Engagement,
            Intent::PredictiveModel => Analysis::PredictiveModel,
            Intent::Summary => Analysis::Summary,
        }
    }

    /// Human-readable plan label for the response.
    ///
    /// Only some intents carry a specific label; the rest keep the generic
    /// "check context" label.
    pub fn plan_label(self) -> &'static str {
        match self {
            Intent::Delivery => "investigate delivery times",
            Intent::Channel => "check acquisition channels",
            Intent::CityRegion => "check city breaks",
            Intent::PredictiveModel => "train ML model",
            Intent::Demographics | Intent::Engagement | Intent::Summary => "check context",
        }
    }
}

/// The fallback-mode planner.
pub struct RulePlanner {
    kb: Arc<KnowledgeBase>,
    registry: Arc<ToolRegistry>,
}

impl RulePlanner {
    pub fn new(kb: Arc<KnowledgeBase>, registry: Arc<ToolRegistry>) -> Self {
        Self { kb, registry }
    }

    /// Classify, dispatch one tool, and compose the final response text.
    pub fn plan_and_execute(&self, query: &str) -> String {
        // Mandatory context lookup — diagnostic only, see module docs.
        let context = self.kb.retrieve(query);
        tracing::info!(
            context_preview = %context.chars().take(50).collect::<String>(),
            "planner: retrieved business context"
        );

        let intent = Intent::classify(query);
        let tool_name = intent.analysis().tool_name();
        tracing::info!(?intent, tool = tool_name, "planner: decided tool call");

        let result = self.registry.dispatch(tool_name, &serde_json::json!({}));

        compose_response(intent.plan_label(), &result)
    }
}

/// Fixed fallback response template: banner, plan label, analysis result,
/// recommendation footer.
fn compose_response(plan_label: &str, result: &str) -> String {
    format!(
        "\n--- AGENT RESPONSE (RULE-BASED MODE) ---\n\
         Plan: the user asked about '{plan_label}'.\n\n\
         Analysis Result:\n{result}\n\n\
         Recommendation:\n{RECOMMENDATION}\n\
         ----------------------\n"
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────
