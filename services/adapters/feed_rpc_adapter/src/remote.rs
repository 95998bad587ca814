//! Client for an already-operated canonical registry
//!
//! Networks with a pinned deployment (Ethereum uses Chainlink's own feed registry)
//! are read through the registry contract's pair-keyed surface instead of a local
//! directory.

use ethers::abi::{parse_abi, Detokenize, Tokenize};
use ethers::contract::{BaseContract, Contract};
use ethers::providers::Middleware;
use ethers::types::{Address, I256, U256};
use feed_registry::{FeedResult, RoundData};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AdapterError, Result};
use crate::rpc_client::{feed_error, round_id_arg, to_round, RawRound};

/// FeedRegistryInterface read surface
pub const FEED_REGISTRY_ABI: &[&str] = &[
    "function decimals(address, address) external view returns (uint8)",
    "function description(address, address) external view returns (string)",
    "function version(address, address) external view returns (uint256)",
    "function latestRoundData(address, address) external view returns (uint80, int256, uint256, uint256, uint80)",
    "function getRoundData(address, address, uint80) external view returns (uint80, int256, uint256, uint256, uint80)",
    "function latestAnswer(address, address) external view returns (int256)",
    "function latestTimestamp(address, address) external view returns (uint256)",
    "function latestRound(address, address) external view returns (uint256)",
    "function getAnswer(address, address, uint256) external view returns (int256)",
    "function getTimestamp(address, address, uint256) external view returns (uint256)",
    "function getFeed(address, address) external view returns (address)",
];

pub struct RemoteRegistry<M> {
    contract: Contract<M>,
}

impl<M: Middleware + 'static> RemoteRegistry<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        let abi = parse_abi(FEED_REGISTRY_ABI).map_err(|e| AdapterError::Abi(e.to_string()))?;
        Ok(Self {
            contract: Contract::<M>::new(address, BaseContract::from(abi), client),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    async fn call<A, T>(&self, method: &'static str, args: A) -> FeedResult<T>
    where
        A: Tokenize + Send,
        T: Detokenize + Send,
    {
        debug!(
            "eth_call {} on registry 0x{}",
            method,
            hex::encode(self.address().as_bytes())
        );
        let call = self
            .contract
            .method::<A, T>(method, args)
            .map_err(|e| feed_registry::FeedCallError::Decode(e.to_string()))?;
        call.call().await.map_err(feed_error)
    }

    pub async fn decimals(&self, base: Address, quote: Address) -> FeedResult<u8> {
        self.call("decimals", (base, quote)).await
    }

    pub async fn description(&self, base: Address, quote: Address) -> FeedResult<String> {
        self.call("description", (base, quote)).await
    }

    pub async fn version(&self, base: Address, quote: Address) -> FeedResult<U256> {
        self.call("version", (base, quote)).await
    }

    pub async fn latest_round_data(&self, base: Address, quote: Address) -> FeedResult<RoundData> {
        let raw: RawRound = self.call("latestRoundData", (base, quote)).await?;
        Ok(to_round(raw))
    }

    pub async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: u128,
    ) -> FeedResult<RoundData> {
        let raw: RawRound = self
            .call("getRoundData", (base, quote, round_id_arg(round_id)?))
            .await?;
        Ok(to_round(raw))
    }

    pub async fn latest_answer(&self, base: Address, quote: Address) -> FeedResult<I256> {
        self.call("latestAnswer", (base, quote)).await
    }

    pub async fn latest_timestamp(&self, base: Address, quote: Address) -> FeedResult<U256> {
        self.call("latestTimestamp", (base, quote)).await
    }

    pub async fn latest_round(&self, base: Address, quote: Address) -> FeedResult<U256> {
        self.call("latestRound", (base, quote)).await
    }

    pub async fn get_answer(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> FeedResult<I256> {
        self.call("getAnswer", (base, quote, round_id)).await
    }

    pub async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> FeedResult<U256> {
        self.call("getTimestamp", (base, quote, round_id)).await
    }

    /// Aggregator the canonical registry currently routes the pair to
    pub async fn get_feed(&self, base: Address, quote: Address) -> FeedResult<Address> {
        self.call("getFeed", (base, quote)).await
    }
}
