//! Error types for the feed RPC adapter

use feed_registry::RegistryError;
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Embedded ABI failed to parse
    #[error("Invalid ABI: {0}")]
    Abi(String),

    /// Could not create a provider for the endpoint
    #[error("Provider setup failed for {url}: {reason}")]
    Provider { url: String, reason: String },

    /// Signing key could not be parsed
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// Query needs an argument that was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// Query argument outside the range the feed accepts
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Error raised by the registry or passed through from a feed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
