//! Mode selection and query routing.
//!
//! The `Analyst` decides once, at startup, whether to run in Primary
//! (LLM tool-calling) or Fallback (rule-based planner) mode, based solely
//! on credential availability. Every query still degrades per-call: a
//! Primary-mode transport or protocol failure routes that query through
//! the planner instead of surfacing an error. `process` always returns a
//! response string.

use std::sync::Arc;

use crate::agent::knowledge::{ContextTool, KnowledgeBase};
use crate::agent::planner::RulePlanner;
use crate::agent::primary::LlmAgent;
use crate::inference::{config, AgentConfig, InferenceClient};
use crate::tools::analytics::standard_tools;
use crate::tools::{AnalysisTool, DataStore, ToolRegistry};

/// Operating mode, fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// LLM-driven tool calling against an OpenAI-compatible endpoint.
    Primary,
    /// Deterministic keyword planner, no network.
    Fallback,
}

/// The query-answering agent.
pub struct Analyst {
    mode: Mode,
    primary: Option<LlmAgent>,
    planner: RulePlanner,
}

impl Analyst {
    /// Build the agent, resolving the API credential from the environment.
    pub fn initialize(cfg: &AgentConfig) -> Self {
        Self::initialize_with_credential(cfg, config::resolve_api_key())
    }

    /// Build the agent with an explicit credential decision.
    ///
    /// `None` means no usable key (absent, empty, or a placeholder) and
    /// selects Fallback mode without ever constructing an HTTP client.
    pub fn initialize_with_credential(cfg: &AgentConfig, api_key: Option<String>) -> Self {
        let store = Arc::new(DataStore::load(&cfg.data_dir));
        let kb = Arc::new(KnowledgeBase::new());

        let mut tools: Vec<Box<dyn AnalysisTool>> =
            vec![Box::new(ContextTool::new(Arc::clone(&kb)))];
        tools.extend(standard_tools(store, cfg.plot_dir.clone()));
        let registry = Arc::new(ToolRegistry::new(tools));

        let planner = RulePlanner::new(kb, Arc::clone(&registry));

        let primary = match api_key {
            Some(key) => match InferenceClient::new(cfg, key) {
                Ok(client) => Some(LlmAgent::new(client, Arc::clone(&registry), cfg.max_turns)),
                Err(e) => {
                    tracing::warn!(error = %e, "inference client unavailable, using fallback mode");
                    None
                }
            },
            None => {
                tracing::info!("no API credential, using fallback mode");
                None
            }
        };

        let mode = if primary.is_some() {
            Mode::Primary
        } else {
            Mode::Fallback
        };
        tracing::info!(?mode, tools = registry.len(), "analyst initialized");

        Self {
            mode,
            primary,
            planner,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Answer one query. Never fails: Primary-mode errors degrade to the
    /// rule-based planner for this query.
    pub async fn process(&self, query: &str) -> String {
        if let Some(agent) = &self.primary {
            match agent.run(query).await {
                Ok(answer) => return answer,
                Err(e) => {
                    tracing::warn!(error = %e, "primary mode failed, falling back to planner");
                }
            }
        }
        self.planner.plan_and_execute(query)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
