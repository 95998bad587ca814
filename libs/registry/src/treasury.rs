//! Recovery of tokens sent to the registry by mistake

use async_trait::async_trait;
use ethers::types::{Address, U256};
use thiserror::Error;

/// Failure reported by the token being moved
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The token contract rejected the transfer
    #[error("Transfer of token {token:?} rejected: {reason}")]
    Rejected { token: Address, reason: String },

    /// The transfer never reached the token
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Moves tokens out of the registry's own holdings
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn transfer(
        &self,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError>;
}
