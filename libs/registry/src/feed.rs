//! Price-feed read surface consumed by the registry
//!
//! A `FeedClient` knows how to reach any feed address (an on-chain aggregator or
//! proxy behind an RPC endpoint, an in-process simulation, ...). The registry only
//! ever hands it the address recorded for a pair; it makes no other assumption
//! about what sits behind the address.

use async_trait::async_trait;
use ethers::types::{Address, I256, U256};
use thiserror::Error;

use crate::types::RoundData;

/// Result of a single call against a feed address
pub type FeedResult<T> = std::result::Result<T, FeedCallError>;

/// Failure produced by the feed being called
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedCallError {
    /// The target executed and reverted
    #[error("Feed call reverted: {0}")]
    Reverted(String),

    /// The target does not expose the requested method
    #[error("Feed does not implement {method}")]
    NotImplemented { method: &'static str },

    /// The call never reached the target
    #[error("Transport error: {0}")]
    Transport(String),

    /// The target answered with data that does not decode to the expected type
    #[error("Failed to decode feed response: {0}")]
    Decode(String),
}

/// Calls the AggregatorV2V3 read surface, plus the proxy introspection method,
/// on an arbitrary feed address.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn decimals(&self, feed: Address) -> FeedResult<u8>;

    async fn description(&self, feed: Address) -> FeedResult<String>;

    async fn version(&self, feed: Address) -> FeedResult<U256>;

    async fn latest_round_data(&self, feed: Address) -> FeedResult<RoundData>;

    async fn get_round_data(&self, feed: Address, round_id: u128) -> FeedResult<RoundData>;

    async fn latest_answer(&self, feed: Address) -> FeedResult<I256>;

    async fn latest_timestamp(&self, feed: Address) -> FeedResult<U256>;

    async fn latest_round(&self, feed: Address) -> FeedResult<U256>;

    async fn get_answer(&self, feed: Address, round_id: U256) -> FeedResult<I256>;

    async fn get_timestamp(&self, feed: Address, round_id: U256) -> FeedResult<U256>;

    /// Underlying aggregator of a proxy feed.
    ///
    /// Terminal aggregators fail this call, usually with `NotImplemented` or
    /// `Reverted`.
    async fn aggregator(&self, proxy: Address) -> FeedResult<Address>;
}
