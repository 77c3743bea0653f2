use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorkOrderError {
    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to load options from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid options: {0}")]
    ConfigInvalid(String),

    #[error("failed to load glossary from {path}: {reason}")]
    GlossaryLoad { path: PathBuf, reason: String },

    #[error("invalid glossary: {0}")]
    GlossaryInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
