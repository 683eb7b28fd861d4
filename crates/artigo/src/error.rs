//! CLI error types.

use artigo_config::ConfigError;
use artigo_renderer::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Content could not be rendered: {0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Validation(String),
}
