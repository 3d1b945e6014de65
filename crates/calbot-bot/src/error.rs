//! Bot error types.

use calbot_core::TracingError;
use calbot_providers::ProviderError;
use calbot_server::StoreError;
use thiserror::Error;

use crate::secret::SecretError;

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that stop the bot or a CLI subcommand.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to resolve {what}: {source}")]
    Secret {
        what: &'static str,
        #[source]
        source: SecretError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Tracing(#[from] TracingError),

    #[error("database error: {0}")]
    Store(#[from] StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),
}

impl BotError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
