//! Shared test utilities: an in-memory feed network and token ledger

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, I256, U256};
use feed_registry::{FeedCallError, FeedClient, FeedResult, RoundData, TokenLedger, TransferError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn int(n: u64) -> I256 {
    I256::from_raw(U256::from(n))
}

/// LINK token on Ethereum
pub fn link() -> Address {
    "0xa36085F69e2889c224210F603D836748e7dC0088".parse().unwrap()
}

/// Chainlink's USD denomination
pub fn usd() -> Address {
    "0x0000000000000000000000000000000000000348".parse().unwrap()
}

pub const GOVERNOR: u64 = 0x600;
pub const SUPER_ADMIN: u64 = 0x5a;
pub const ADMIN: u64 = 0xad;
pub const STRANGER: u64 = 0xbad;

/// Canned answers of one simulated feed
#[derive(Debug, Clone, Default)]
pub struct MockFeed {
    pub decimals: u8,
    pub description: String,
    pub version: U256,
    pub latest_round_data: RoundData,
    pub rounds: HashMap<u128, RoundData>,
    pub latest_answer: I256,
    pub latest_timestamp: U256,
    pub latest_round: U256,
    pub answers: HashMap<U256, I256>,
    pub timestamps: HashMap<U256, U256>,
    /// Set for proxies
    pub aggregator: Option<Address>,
    /// Every read reverts with this reason
    pub revert: Option<String>,
}

impl MockFeed {
    /// Feed with distinct, recognizable answers for every read
    pub fn sample() -> Self {
        let round = RoundData {
            round_id: 1,
            answer: int(2),
            started_at: U256::from(3),
            updated_at: U256::from(4),
            answered_in_round: 5,
        };
        Self {
            decimals: 18,
            description: "some random description".to_string(),
            version: U256::from(2),
            latest_round_data: round,
            rounds: HashMap::from([(1000, round)]),
            latest_answer: int(10),
            latest_timestamp: U256::from(20),
            latest_round: U256::from(30),
            answers: HashMap::from([(U256::from(1234), int(40))]),
            timestamps: HashMap::from([(U256::from(1234), U256::from(50))]),
            aggregator: None,
            revert: None,
        }
    }

    pub fn proxy_for(aggregator: Address) -> Self {
        Self {
            aggregator: Some(aggregator),
            ..Self::sample()
        }
    }
}

/// Call observed by the network, with the arguments it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCall {
    Decimals(Address),
    Description(Address),
    Version(Address),
    LatestRoundData(Address),
    GetRoundData(Address, u128),
    LatestAnswer(Address),
    LatestTimestamp(Address),
    LatestRound(Address),
    GetAnswer(Address, U256),
    GetTimestamp(Address, U256),
    Aggregator(Address),
}

/// Addresses → simulated feeds, recording every call
#[derive(Default)]
pub struct MockFeedNetwork {
    feeds: Mutex<HashMap<Address, MockFeed>>,
    calls: Mutex<Vec<FeedCall>>,
    /// While set, every call fails as if the node were unreachable
    outage: Mutex<Option<String>>,
}

impl MockFeedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deploy(&self, address: Address, feed: MockFeed) {
        self.feeds.lock().insert(address, feed);
    }

    pub fn update(&self, address: Address, f: impl FnOnce(&mut MockFeed)) {
        if let Some(feed) = self.feeds.lock().get_mut(&address) {
            f(feed);
        }
    }

    /// Forwarded reads only; classification calls are filtered out
    pub fn reads(&self) -> Vec<FeedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| !matches!(call, FeedCall::Aggregator(_)))
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<FeedCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn go_offline(&self, reason: &str) {
        *self.outage.lock() = Some(reason.to_string());
    }

    pub fn go_online(&self) {
        *self.outage.lock() = None;
    }

    fn unreachable(&self) -> FeedResult<()> {
        match self.outage.lock().clone() {
            Some(reason) => Err(FeedCallError::Transport(reason)),
            None => Ok(()),
        }
    }

    fn call<T>(
        &self,
        call: FeedCall,
        address: Address,
        read: impl FnOnce(&MockFeed) -> Option<T>,
    ) -> FeedResult<T> {
        self.calls.lock().push(call);
        self.unreachable()?;
        let feeds = self.feeds.lock();
        let feed = feeds
            .get(&address)
            .ok_or_else(|| FeedCallError::Reverted("call to non-contract".to_string()))?;
        if let Some(reason) = &feed.revert {
            return Err(FeedCallError::Reverted(reason.clone()));
        }
        read(feed).ok_or_else(|| FeedCallError::Reverted("No data present".to_string()))
    }
}

#[async_trait]
impl FeedClient for MockFeedNetwork {
    async fn decimals(&self, feed: Address) -> FeedResult<u8> {
        self.call(FeedCall::Decimals(feed), feed, |f| Some(f.decimals))
    }

    async fn description(&self, feed: Address) -> FeedResult<String> {
        self.call(FeedCall::Description(feed), feed, |f| {
            Some(f.description.clone())
        })
    }

    async fn version(&self, feed: Address) -> FeedResult<U256> {
        self.call(FeedCall::Version(feed), feed, |f| Some(f.version))
    }

    async fn latest_round_data(&self, feed: Address) -> FeedResult<RoundData> {
        self.call(FeedCall::LatestRoundData(feed), feed, |f| {
            Some(f.latest_round_data)
        })
    }

    async fn get_round_data(&self, feed: Address, round_id: u128) -> FeedResult<RoundData> {
        self.call(FeedCall::GetRoundData(feed, round_id), feed, |f| {
            f.rounds.get(&round_id).copied()
        })
    }

    async fn latest_answer(&self, feed: Address) -> FeedResult<I256> {
        self.call(FeedCall::LatestAnswer(feed), feed, |f| Some(f.latest_answer))
    }

    async fn latest_timestamp(&self, feed: Address) -> FeedResult<U256> {
        self.call(FeedCall::LatestTimestamp(feed), feed, |f| {
            Some(f.latest_timestamp)
        })
    }

    async fn latest_round(&self, feed: Address) -> FeedResult<U256> {
        self.call(FeedCall::LatestRound(feed), feed, |f| Some(f.latest_round))
    }

    async fn get_answer(&self, feed: Address, round_id: U256) -> FeedResult<I256> {
        self.call(FeedCall::GetAnswer(feed, round_id), feed, |f| {
            f.answers.get(&round_id).copied()
        })
    }

    async fn get_timestamp(&self, feed: Address, round_id: U256) -> FeedResult<U256> {
        self.call(FeedCall::GetTimestamp(feed, round_id), feed, |f| {
            f.timestamps.get(&round_id).copied()
        })
    }

    async fn aggregator(&self, proxy: Address) -> FeedResult<Address> {
        self.calls.lock().push(FeedCall::Aggregator(proxy));
        self.unreachable()?;
        self.feeds
            .lock()
            .get(&proxy)
            .and_then(|feed| feed.aggregator)
            .ok_or(FeedCallError::NotImplemented {
                method: "aggregator",
            })
    }
}

/// Records transfers instead of moving anything
#[derive(Default)]
pub struct MockLedger {
    pub transfers: Mutex<Vec<(Address, Address, U256)>>,
    pub reject: Mutex<Option<String>>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn transfers(&self) -> Vec<(Address, Address, U256)> {
        self.transfers.lock().clone()
    }
}

#[async_trait]
impl TokenLedger for MockLedger {
    async fn transfer(
        &self,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        if let Some(reason) = self.reject.lock().clone() {
            return Err(TransferError::Rejected { token, reason });
        }
        self.transfers.lock().push((token, recipient, amount));
        Ok(())
    }
}
