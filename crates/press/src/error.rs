//! CLI error types.

use press_config::ConfigError;
use press_render::PrepareError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Prepare(#[from] PrepareError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
