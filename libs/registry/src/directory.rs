//! Pair key → feed record mapping
//!
//! Assignments are validated and classified in full before any record is
//! written, so a batch either takes effect completely or not at all.

use ethers::types::Address;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::auth::AuthorizationPolicy;
use crate::classify::classify;
use crate::error::{RegistryError, Result};
use crate::feed::FeedClient;
use crate::types::{FeedAssignment, FeedRecord, PairKey};

#[derive(Debug, Clone, Default)]
pub struct FeedDirectory {
    records: HashMap<PairKey, FeedRecord>,
}

impl FeedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `pair`, or the absent record if it was never assigned
    pub fn lookup(&self, pair: &PairKey) -> FeedRecord {
        self.records.get(pair).copied().unwrap_or_default()
    }

    /// Number of pairs with a live assignment
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live assignments, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &FeedRecord)> {
        self.records.iter()
    }

    /// Authorized batch assignment.
    ///
    /// Returns the entries to publish in the `FeedsModified` event.
    pub async fn assign_batch<P>(
        &mut self,
        policy: &P,
        caller: Address,
        client: &dyn FeedClient,
        assignments: &[FeedAssignment],
    ) -> Result<Vec<FeedAssignment>>
    where
        P: AuthorizationPolicy + ?Sized,
    {
        if !policy.is_authorized_to_mutate(caller) {
            warn!(
                "Rejected feed assignment from unauthorized caller 0x{}",
                hex::encode(caller.as_bytes())
            );
            return Err(RegistryError::Unauthorized { caller });
        }
        self.apply_batch(client, assignments).await
    }

    /// Validate, classify and commit without an authorization check
    pub(crate) async fn apply_batch(
        &mut self,
        client: &dyn FeedClient,
        assignments: &[FeedAssignment],
    ) -> Result<Vec<FeedAssignment>> {
        validate(assignments)?;

        let mut staged = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let record = if assignment.is_removal() {
                FeedRecord::absent()
            } else {
                let class = classify(client, assignment.feed).await?;
                FeedRecord {
                    feed: assignment.feed,
                    is_proxy: class.is_proxy(),
                }
            };
            staged.push((assignment.pair(), record));
        }

        for (pair, record) in staged {
            if record.is_absent() {
                self.records.remove(&pair);
                debug!("Removed feed for {}", pair);
            } else {
                self.records.insert(pair, record);
                debug!(
                    "Assigned feed 0x{} (proxy: {}) to {}",
                    hex::encode(record.feed.as_bytes()),
                    record.is_proxy,
                    pair
                );
            }
        }

        info!("Feeds modified: {} entries", assignments.len());
        Ok(assignments.to_vec())
    }
}

/// Non-removal entries need both sides of the pair to be non-zero.
///
/// Removal entries skip the check: the pair was validated when first assigned.
pub fn validate(assignments: &[FeedAssignment]) -> Result<()> {
    for assignment in assignments {
        if !assignment.is_removal() && !assignment.pair().is_valid() {
            return Err(RegistryError::InvalidIdentifier {
                base: assignment.base,
                quote: assignment.quote,
            });
        }
    }
    Ok(())
}
