//! Agent layer — mode selection, planning, and the knowledge base.
//!
//! Two ways to answer a query:
//! - [`primary`]: an LLM drives the tool loop over the chat-completions API.
//! - [`planner`]: a deterministic keyword planner picks exactly one tool.
//!
//! [`analyst::Analyst`] owns both and routes between them.

pub mod analyst;
pub mod knowledge;
pub mod planner;
pub mod primary;

pub use analyst::{Analyst, Mode};
pub use knowledge::KnowledgeBase;
pub use planner::{Intent, RulePlanner};
