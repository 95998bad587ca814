//! Proxy / terminal aggregator classification
//!
//! Calls the proxy introspection method on a candidate feed. A revert, a missing
//! method or undecodable return data all mean "not a proxy". A transport failure
//! says nothing about the feed and is returned to the caller.

use ethers::types::Address;
use tracing::{debug, warn};

use crate::feed::{FeedCallError, FeedClient, FeedResult};

/// Outcome of probing a candidate feed address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Thin pointer to a swappable aggregator
    Proxy { aggregator: Address },
    /// Answers price queries directly
    Aggregator,
}

impl Classification {
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Proxy { .. })
    }
}

/// Classify `feed` by calling `aggregator()` on it.
pub async fn classify(client: &dyn FeedClient, feed: Address) -> FeedResult<Classification> {
    match client.aggregator(feed).await {
        Ok(aggregator) => {
            debug!(
                "Feed 0x{} is a proxy for 0x{}",
                hex::encode(feed.as_bytes()),
                hex::encode(aggregator.as_bytes())
            );
            Ok(Classification::Proxy { aggregator })
        }
        Err(FeedCallError::Transport(reason)) => {
            warn!(
                "Could not classify feed 0x{}: {}",
                hex::encode(feed.as_bytes()),
                reason
            );
            Err(FeedCallError::Transport(reason))
        }
        Err(e) => {
            debug!(
                "Feed 0x{} treated as terminal aggregator: {}",
                hex::encode(feed.as_bytes()),
                e
            );
            Ok(Classification::Aggregator)
        }
    }
}
