//! Error types for the client cache control engine

use thiserror::Error;

/// Result type alias for client cache control operations
pub type Result<T> = std::result::Result<T, ClientCacheError>;

/// Error types that can occur in the client cache control engine
///
/// Configuration errors are reported at load/update time; the offending
/// entry is excluded and the previously-valid state keeps serving. Nothing
/// on the request path produces an error: resolution misses fall back to
/// the default template and override violations are only logged. Provider
/// errors are the single variant expected to propagate to a caller.
#[derive(Error, Debug, Clone)]
pub enum ClientCacheError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unresolved configuration placeholder in template '{template}': {text}")]
    UnresolvedPlaceholder { template: String, text: String },

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalidation provider '{provider}' error: {message}")]
    ProviderError { provider: String, message: String },
}

impl From<std::io::Error> for ClientCacheError {
    fn from(err: std::io::Error) -> Self {
        ClientCacheError::IoError(err.to_string())
    }
}

impl ClientCacheError {
    /// Create a ProviderError for the named invalidation provider
    pub fn provider_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ClientCacheError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error only excludes a single configuration entry while
    /// the rest of the set keeps loading
    pub fn is_config_entry_error(&self) -> bool {
        matches!(
            self,
            ClientCacheError::InvalidRule { .. } | ClientCacheError::InvalidPattern { .. }
        )
    }
}
