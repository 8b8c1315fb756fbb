//! Agent configuration loading and credential resolution.
//!
//! Reads `shopease.yaml` and resolves environment variables. Config is the
//! single source of truth for the model endpoint, sampling, and the data and
//! plot directories the analysis tools use.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::InferenceError;

/// Environment variable holding the API credential for Primary mode.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Keys shipped in `.env` templates start with this prefix until the user
/// pastes a real one. Treated the same as an absent credential.
const PLACEHOLDER_PREFIX: &str = "paste_your";

// ─── Public Types ───────────────────────────────────────────────────────────

/// Runtime configuration for the analyst agent (mirrors `shopease.yaml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model name sent to the chat-completions endpoint.
    pub model: String,
    /// OpenAI-compatible base URL (no trailing slash).
    pub base_url: String,
    /// Sampling temperature. 0.0 keeps tool selection deterministic.
    pub temperature: f32,
    /// Completion token budget per turn.
    pub max_tokens: u32,
    /// Maximum tool-calling turns before Primary mode gives up.
    pub max_turns: u32,
    /// Directory holding the four source CSVs.
    pub data_dir: PathBuf,
    /// Directory where charts are written.
    pub plot_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            max_turns: 6,
            data_dir: PathBuf::from("data"),
            plot_dir: PathBuf::from("plots"),
        }
    }
}

// ─── Loading ────────────────────────────────────────────────────────────────

/// Resolve the config file path.
///
/// Checks `SHOPEASE_CONFIG` first, then walks upward from `start` looking
/// for `shopease.yaml`. Returns `None` when no config file exists — the
/// defaults are a complete configuration on their own.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("SHOPEASE_CONFIG") {
        let candidate = PathBuf::from(explicit);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("shopease.yaml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    None
}

/// Load and parse the agent configuration file.
///
/// Performs environment-variable interpolation on string values matching
/// `${VAR}` or `${VAR:-default}` before parsing.
pub fn load_agent_config(path: &Path) -> Result<AgentConfig, InferenceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let interpolated = interpolate_env_vars(&raw);

    serde_yaml::from_str(&interpolated).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to parse config: {e}"),
    })
}

/// Load config from the conventional location, or fall back to defaults.
pub fn load_or_default(start: &Path) -> Result<AgentConfig, InferenceError> {
    match find_config_path(start) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading agent config");
            load_agent_config(&path)
        }
        None => {
            tracing::info!("no shopease.yaml found — using default config");
            Ok(AgentConfig::default())
        }
    }
}

// ─── Credentials ────────────────────────────────────────────────────────────

/// Resolve the API credential from the environment.
///
/// Returns `None` when the variable is unset, empty, or still holds the
/// `.env` template placeholder — all of which select Fallback mode.
pub fn resolve_api_key() -> Option<String> {
    usable_key(&std::env::var(API_KEY_ENV).ok()?)
}

/// Keep a key only if it looks real.
fn usable_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(PLACEHOLDER_PREFIX) {
        return None;
    }
    Some(trimmed.to_string())
}

// ─── Env-var interpolation ──────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some(idx) = expr.find(":-") {
        let var_name = &expr[..idx];
        let default = &expr[idx + 2..];
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_env_vars_with_default() {
        std::env::remove_var("__SHOPEASE_NONEXISTENT__");
        let input = "${__SHOPEASE_NONEXISTENT__:-/fallback/path}";
        assert_eq!(interpolate_env_vars(input), "/fallback/path");
    }

    #[test]
    fn interpolate_env_vars_with_value() {
        std::env::set_var("__SHOPEASE_CONFIG_VAR__", "/custom/path");
        let input = "${__SHOPEASE_CONFIG_VAR__:-/fallback/path}";
        assert_eq!(interpolate_env_vars(input), "/custom/path");
        std::env::remove_var("__SHOPEASE_CONFIG_VAR__");
    }

    #[test]
    fn interpolate_no_vars() {
        let input = "plain text with no variables";
        assert_eq!(interpolate_env_vars(input), input);
    }

    #[test]
    fn expand_tilde_resolves_home() {
        let result = expand_tilde("~/plots");
        assert!(!result.starts_with('~'), "tilde should be expanded");
        assert!(result.ends_with("/plots"));
    }

    #[test]
    fn default_config_is_complete() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_turns, 6);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "model: gpt-4o-mini\ndata_dir: /srv/shopease/data\n";
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.data_dir, PathBuf::from("/srv/shopease/data"));
        // Untouched fields keep their defaults
        assert_eq!(config.max_turns, 6);
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn placeholder_and_empty_keys_are_rejected() {
        assert_eq!(usable_key(""), None);
        assert_eq!(usable_key("   "), None);
        assert_eq!(usable_key("paste_your_key_here"), None);
        assert_eq!(usable_key("sk-live-abc123"), Some("sk-live-abc123".to_string()));
        assert_eq!(usable_key("  sk-live-abc123  "), Some("sk-live-abc123".to_string()));
    }

    #[test]
    fn load_agent_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopease.yaml");
        std::fs::write(&path, "model: gpt-4o\nmax_turns: 3\n").unwrap();
        let config = load_agent_config(&path).unwrap();
        assert_eq!(config.max_turns, 3);
    }
}
