//! ShopEase churn-analysis agent.
//!
//! A query-answering agent over the ShopEase customer dataset. Runs in one
//! of two modes, chosen at startup from credential availability:
//!
//! - **Primary**: an LLM (OpenAI-compatible chat completions) drives a
//!   tool-calling loop over the statistical analysis tools.
//! - **Fallback**: a rule-based keyword planner dispatches exactly one tool
//!   and composes a templated response. No network access.
//!
//! Either way, [`agent::Analyst::process`] always returns a response string;
//! data problems and Primary-mode failures degrade, they never propagate.

pub mod agent;
pub mod inference;
pub mod tools;

pub use agent::{Analyst, Mode};
pub use inference::AgentConfig;
