//! RPC client for calling price feeds
//!
//! Implements the registry's `FeedClient` against real AggregatorV2V3 contracts
//! and aggregator proxies. Calls are `eth_call`s; a revert is reported as
//! `FeedCallError::Reverted` with the raw revert data, node failures as
//! `FeedCallError::Transport`.

use async_trait::async_trait;
use ethers::abi::{parse_abi, Detokenize, Tokenize};
use ethers::contract::{BaseContract, Contract, ContractError};
use ethers::providers::Middleware;
use ethers::types::{Address, I256, U256};
use feed_registry::{FeedCallError, FeedClient, FeedResult, RoundData};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AdapterError, Result};

/// AggregatorV2V3Interface plus the proxy introspection method
pub const AGGREGATOR_ABI: &[&str] = &[
    "function decimals() external view returns (uint8)",
    "function description() external view returns (string)",
    "function version() external view returns (uint256)",
    "function latestRoundData() external view returns (uint80, int256, uint256, uint256, uint80)",
    "function getRoundData(uint80) external view returns (uint80, int256, uint256, uint256, uint80)",
    "function latestAnswer() external view returns (int256)",
    "function latestTimestamp() external view returns (uint256)",
    "function latestRound() external view returns (uint256)",
    "function getAnswer(uint256) external view returns (int256)",
    "function getTimestamp(uint256) external view returns (uint256)",
    "function aggregator() external view returns (address)",
];

/// Raw `(roundId, answer, startedAt, updatedAt, answeredInRound)` tuple
pub(crate) type RawRound = (U256, I256, U256, U256, U256);

pub(crate) fn to_round(raw: RawRound) -> RoundData {
    let (round_id, answer, started_at, updated_at, answered_in_round) = raw;
    RoundData {
        round_id: round_id.low_u128(),
        answer,
        started_at,
        updated_at,
        answered_in_round: answered_in_round.low_u128(),
    }
}

/// Largest round id a `uint80` parameter can carry
pub const MAX_ROUND_ID: u128 = (1u128 << 80) - 1;

/// Encode a `uint80` round id. Larger ids fail the way the contract's ABI
/// decoder would, with a revert.
pub(crate) fn round_id_arg(round_id: u128) -> FeedResult<U256> {
    if round_id > MAX_ROUND_ID {
        return Err(FeedCallError::Reverted(format!(
            "round id {} exceeds uint80",
            round_id
        )));
    }
    Ok(U256::from(round_id))
}

/// Map a failed contract call onto the feed error surface
pub(crate) fn feed_error<M: Middleware>(e: ContractError<M>) -> FeedCallError {
    match e {
        ContractError::Revert(data) => FeedCallError::Reverted(format!("0x{}", hex::encode(&data))),
        ContractError::MiddlewareError { e } => FeedCallError::Transport(e.to_string()),
        ContractError::ProviderError { e } => FeedCallError::Transport(e.to_string()),
        other => FeedCallError::Decode(other.to_string()),
    }
}

pub struct RpcFeedClient<M> {
    client: Arc<M>,
    abi: BaseContract,
}

impl<M: Middleware + 'static> RpcFeedClient<M> {
    pub fn new(client: Arc<M>) -> Result<Self> {
        let abi = parse_abi(AGGREGATOR_ABI).map_err(|e| AdapterError::Abi(e.to_string()))?;
        Ok(Self {
            client,
            abi: BaseContract::from(abi),
        })
    }

    async fn call<A, T>(&self, feed: Address, method: &'static str, args: A) -> FeedResult<T>
    where
        A: Tokenize + Send,
        T: Detokenize + Send,
    {
        debug!("eth_call {} on 0x{}", method, hex::encode(feed.as_bytes()));
        let contract = Contract::<M>::new(feed, self.abi.clone(), self.client.clone());
        let call = contract
            .method::<A, T>(method, args)
            .map_err(|e| FeedCallError::Decode(e.to_string()))?;
        call.call().await.map_err(feed_error)
    }
}

#[async_trait]
impl<M: Middleware + 'static> FeedClient for RpcFeedClient<M> {
    async fn decimals(&self, feed: Address) -> FeedResult<u8> {
        self.call(feed, "decimals", ()).await
    }

    async fn description(&self, feed: Address) -> FeedResult<String> {
        self.call(feed, "description", ()).await
    }

    async fn version(&self, feed: Address) -> FeedResult<U256> {
        self.call(feed, "version", ()).await
    }

    async fn latest_round_data(&self, feed: Address) -> FeedResult<RoundData> {
        let raw: RawRound = self.call(feed, "latestRoundData", ()).await?;
        Ok(to_round(raw))
    }

    async fn get_round_data(&self, feed: Address, round_id: u128) -> FeedResult<RoundData> {
        let raw: RawRound = self
            .call(feed, "getRoundData", round_id_arg(round_id)?)
            .await?;
        Ok(to_round(raw))
    }

    async fn latest_answer(&self, feed: Address) -> FeedResult<I256> {
        self.call(feed, "latestAnswer", ()).await
    }

    async fn latest_timestamp(&self, feed: Address) -> FeedResult<U256> {
        self.call(feed, "latestTimestamp", ()).await
    }

    async fn latest_round(&self, feed: Address) -> FeedResult<U256> {
        self.call(feed, "latestRound", ()).await
    }

    async fn get_answer(&self, feed: Address, round_id: U256) -> FeedResult<I256> {
        self.call(feed, "getAnswer", round_id).await
    }

    async fn get_timestamp(&self, feed: Address, round_id: U256) -> FeedResult<U256> {
        self.call(feed, "getTimestamp", round_id).await
    }

    async fn aggregator(&self, proxy: Address) -> FeedResult<Address> {
        self.call(proxy, "aggregator", ()).await
    }
}
