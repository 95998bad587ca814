//! Core data model: pair keys, feed records and round data

use ethers::types::{Address, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered (base, quote) pair used to look up a feed.
///
/// No implicit inversion: `(LINK, USD)` and `(USD, LINK)` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub base: Address,
    pub quote: Address,
}

impl PairKey {
    pub fn new(base: Address, quote: Address) -> Self {
        Self { base, quote }
    }

    /// Both sides are non-zero
    pub fn is_valid(&self) -> bool {
        !self.base.is_zero() && !self.quote.is_zero()
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}/0x{}",
            hex::encode(self.base.as_bytes()),
            hex::encode(self.quote.as_bytes())
        )
    }
}

/// Directory entry for a pair.
///
/// The default value is the absent record: zero feed, not a proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub feed: Address,
    pub is_proxy: bool,
}

impl FeedRecord {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.feed.is_zero()
    }
}

/// One (pair, feed) entry of an assignment batch or a `FeedsModified` event.
///
/// A zero `feed` removes the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAssignment {
    pub base: Address,
    pub quote: Address,
    pub feed: Address,
}

impl FeedAssignment {
    pub fn new(base: Address, quote: Address, feed: Address) -> Self {
        Self { base, quote, feed }
    }

    /// Removal entry for a pair
    pub fn removal(base: Address, quote: Address) -> Self {
        Self::new(base, quote, Address::zero())
    }

    pub fn pair(&self) -> PairKey {
        PairKey::new(self.base, self.quote)
    }

    pub fn is_removal(&self) -> bool {
        self.feed.is_zero()
    }
}

/// Full round tuple as returned by `latestRoundData`/`getRoundData`.
///
/// Round ids are `uint80` on chain and fit in a `u128`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: I256,
    pub started_at: U256,
    pub updated_at: U256,
    pub answered_in_round: u128,
}
