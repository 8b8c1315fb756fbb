//! Tool-layer error types.

use thiserror::Error;

/// Errors raised inside analysis tools.
///
/// These never cross the registry boundary as errors — `ToolRegistry::dispatch`
/// converts them to description strings so callers always get a result text.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The customer dataset failed to load or was never loaded.
    #[error("Error: Data not loaded. {reason}")]
    DataUnavailable { reason: String },

    /// A source CSV could not be read or parsed.
    #[error("failed to load {file}: {reason}")]
    CsvError { file: String, reason: String },

    /// Chart rendering failed (tool output degrades to text-only).
    #[error("chart render failed for {path}: {reason}")]
    ChartError { path: String, reason: String },

    /// Model training could not proceed (e.g., a single-class label column).
    #[error("model training failed: {reason}")]
    TrainingError { reason: String },

    /// The requested tool name is not in the registry.
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },
}
