//! Error types for the feed registry

use ethers::types::Address;
use thiserror::Error;

use crate::feed::FeedCallError;
use crate::treasury::TransferError;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Caller-visible failures of registry operations.
///
/// Every variant aborts the triggering call with no state change. Failures coming
/// back from a forwarded feed call or a token transfer are carried unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    /// A required identity was the zero address at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Zero base or quote on a non-removal assignment
    #[error("Invalid identifier in pair {base:?}/{quote:?}")]
    InvalidIdentifier { base: Address, quote: Address },

    /// Caller lacks the capability required by the operation
    #[error("Unauthorized caller {caller:?}")]
    Unauthorized { caller: Address },

    /// No live assignment for the pair
    #[error("Feed not found for pair {base:?}/{quote:?}")]
    FeedNotFound { base: Address, quote: Address },

    /// The assigned feed itself failed
    #[error(transparent)]
    Feed(#[from] FeedCallError),

    /// Token transfer during fund recovery failed
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl RegistryError {
    /// True for failures raised by the registry itself rather than a collaborator
    pub fn is_registry_failure(&self) -> bool {
        !matches!(self, Self::Feed(_) | Self::Transfer(_))
    }
}
