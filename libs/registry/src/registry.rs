//! Feed registry service object
//!
//! Combines the authorization policy, the feed directory and the redirection
//! facade behind one handle. All state sits behind a single lock: mutations hold
//! it exclusively for the whole call (including classification calls), reads
//! hold it only for the directory lookup and release it before forwarding.

use ethers::types::{Address, I256, U256};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::auth::{AuthorizationPolicy, Governor, Role, RoleHierarchy};
use crate::directory::FeedDirectory;
use crate::error::{RegistryError, Result};
use crate::events::{EventBus, RegistryEvent};
use crate::feed::FeedClient;
use crate::treasury::TokenLedger;
use crate::types::{FeedAssignment, FeedRecord, PairKey, RoundData};

struct RegistryState<P> {
    policy: P,
    directory: FeedDirectory,
}

/// Pair-keyed registry that behaves like any single price feed.
pub struct FeedRegistry<P: AuthorizationPolicy> {
    state: RwLock<RegistryState<P>>,
    feeds: Arc<dyn FeedClient>,
    ledger: Arc<dyn TokenLedger>,
    events: EventBus,
}

impl<P: AuthorizationPolicy> FeedRegistry<P> {
    /// Create an empty registry
    pub fn new(policy: P, feeds: Arc<dyn FeedClient>, ledger: Arc<dyn TokenLedger>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                policy,
                directory: FeedDirectory::new(),
            }),
            feeds,
            ledger,
            events: EventBus::new(),
        }
    }

    /// Create a registry pre-populated with `seed`.
    ///
    /// Seed entries are validated and classified like any assignment but need no
    /// authorized caller.
    pub async fn seeded(
        policy: P,
        feeds: Arc<dyn FeedClient>,
        ledger: Arc<dyn TokenLedger>,
        seed: &[FeedAssignment],
    ) -> Result<Self> {
        let registry = Self::new(policy, feeds, ledger);
        {
            let mut state = registry.state.write().await;
            state
                .directory
                .apply_batch(registry.feeds.as_ref(), seed)
                .await?;
        }
        info!("Feed registry seeded with {} entries", seed.len());
        Ok(registry)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Read access to the authorization policy
    pub async fn with_policy<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        let state = self.state.read().await;
        f(&state.policy)
    }

    /// Snapshot of every live assignment
    pub async fn assignments(&self) -> Vec<(PairKey, FeedRecord)> {
        let state = self.state.read().await;
        state
            .directory
            .iter()
            .map(|(pair, record)| (*pair, *record))
            .collect()
    }

    // ---- Feed directory ----

    /// Raw record for the pair; the absent record if never assigned
    pub async fn lookup(&self, base: Address, quote: Address) -> FeedRecord {
        let state = self.state.read().await;
        state.directory.lookup(&PairKey::new(base, quote))
    }

    /// Assign (or, with a zero feed, remove) a single pair
    pub async fn assign(
        &self,
        caller: Address,
        base: Address,
        quote: Address,
        feed: Address,
    ) -> Result<()> {
        self.assign_batch(caller, &[FeedAssignment::new(base, quote, feed)])
            .await
    }

    /// Assign several pairs atomically and publish one `FeedsModified` event
    pub async fn assign_batch(&self, caller: Address, assignments: &[FeedAssignment]) -> Result<()> {
        let mut state = self.state.write().await;
        let RegistryState { policy, directory } = &mut *state;

        let modified = directory
            .assign_batch(&*policy, caller, self.feeds.as_ref(), assignments)
            .await?;

        self.events
            .publish(RegistryEvent::FeedsModified { feeds: modified });
        Ok(())
    }

    // ---- Redirection facade ----

    /// Assigned feed address for the pair
    pub async fn feed(&self, base: Address, quote: Address) -> Result<Address> {
        Ok(self.resolve(base, quote).await?.feed)
    }

    /// Aggregator currently answering for the pair.
    ///
    /// Proxies are asked for their underlying aggregator; a terminal aggregator
    /// answers for itself.
    pub async fn current_aggregator(&self, base: Address, quote: Address) -> Result<Address> {
        let record = self.resolve(base, quote).await?;
        if record.is_proxy {
            Ok(self.feeds.aggregator(record.feed).await?)
        } else {
            Ok(record.feed)
        }
    }

    pub async fn decimals(&self, base: Address, quote: Address) -> Result<u8> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.decimals(feed).await?)
    }

    pub async fn description(&self, base: Address, quote: Address) -> Result<String> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.description(feed).await?)
    }

    pub async fn version(&self, base: Address, quote: Address) -> Result<U256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.version(feed).await?)
    }

    pub async fn latest_round_data(&self, base: Address, quote: Address) -> Result<RoundData> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.latest_round_data(feed).await?)
    }

    pub async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: u128,
    ) -> Result<RoundData> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.get_round_data(feed, round_id).await?)
    }

    pub async fn latest_answer(&self, base: Address, quote: Address) -> Result<I256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.latest_answer(feed).await?)
    }

    pub async fn latest_timestamp(&self, base: Address, quote: Address) -> Result<U256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.latest_timestamp(feed).await?)
    }

    pub async fn latest_round(&self, base: Address, quote: Address) -> Result<U256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.latest_round(feed).await?)
    }

    pub async fn get_answer(&self, base: Address, quote: Address, round_id: U256) -> Result<I256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.get_answer(feed, round_id).await?)
    }

    pub async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> Result<U256> {
        let feed = self.feed(base, quote).await?;
        Ok(self.feeds.get_timestamp(feed, round_id).await?)
    }

    // ---- Treasury recovery ----

    /// Send `amount` of `token` held by the registry to `recipient`
    pub async fn recover(
        &self,
        caller: Address,
        recipient: Address,
        token: Address,
        amount: U256,
    ) -> Result<()> {
        let state = self.state.write().await;
        if !state.policy.is_authorized_to_recover_funds(caller) {
            warn!(
                "Rejected fund recovery from unauthorized caller 0x{}",
                hex::encode(caller.as_bytes())
            );
            return Err(RegistryError::Unauthorized { caller });
        }

        self.ledger.transfer(token, recipient, amount).await?;
        drop(state);

        info!(
            "Sent {} of token 0x{} to 0x{}",
            amount,
            hex::encode(token.as_bytes()),
            hex::encode(recipient.as_bytes())
        );
        self.events.publish(RegistryEvent::DustSent {
            token,
            amount,
            recipient,
        });
        Ok(())
    }

    async fn resolve(&self, base: Address, quote: Address) -> Result<FeedRecord> {
        let record = self.lookup(base, quote).await;
        if record.is_absent() {
            debug!("No feed for {}", PairKey::new(base, quote));
            return Err(RegistryError::FeedNotFound { base, quote });
        }
        Ok(record)
    }
}

impl FeedRegistry<Governor> {
    /// Registry governed by a single identity
    pub fn with_governor(
        governor: Address,
        feeds: Arc<dyn FeedClient>,
        ledger: Arc<dyn TokenLedger>,
    ) -> Result<Self> {
        Ok(Self::new(Governor::new(governor)?, feeds, ledger))
    }

    pub async fn governor(&self) -> Address {
        self.with_policy(|policy| policy.governor()).await
    }

    pub async fn pending_governor(&self) -> Option<Address> {
        self.with_policy(|policy| policy.pending_governor()).await
    }

    pub async fn set_pending_governor(&self, caller: Address, pending: Address) -> Result<()> {
        let event = {
            let mut state = self.state.write().await;
            state.policy.set_pending_governor(caller, pending)?
        };
        info!("Pending governor set to 0x{}", hex::encode(pending.as_bytes()));
        self.events.publish(event);
        Ok(())
    }

    pub async fn accept_pending_governor(&self, caller: Address) -> Result<()> {
        let event = {
            let mut state = self.state.write().await;
            state.policy.accept_pending_governor(caller)?
        };
        info!("Governor rotated to 0x{}", hex::encode(caller.as_bytes()));
        self.events.publish(event);
        Ok(())
    }
}

impl FeedRegistry<RoleHierarchy> {
    /// Registry administered by a super admin and an initial set of admins
    pub fn with_roles(
        super_admin: Address,
        admins: impl IntoIterator<Item = Address>,
        feeds: Arc<dyn FeedClient>,
        ledger: Arc<dyn TokenLedger>,
    ) -> Result<Self> {
        Ok(Self::new(
            RoleHierarchy::new(super_admin, admins)?,
            feeds,
            ledger,
        ))
    }

    pub async fn has_role(&self, role: Role, account: Address) -> bool {
        self.with_policy(|policy| policy.has_role(role, account))
            .await
    }

    pub async fn role_admin(&self, role: Role) -> Role {
        self.with_policy(|policy| policy.role_admin(role)).await
    }

    pub async fn grant_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let event = {
            let mut state = self.state.write().await;
            state.policy.grant_role(caller, role, account)?
        };
        self.publish_role_change(event);
        Ok(())
    }

    pub async fn revoke_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let event = {
            let mut state = self.state.write().await;
            state.policy.revoke_role(caller, role, account)?
        };
        self.publish_role_change(event);
        Ok(())
    }

    pub async fn renounce_role(&self, caller: Address, role: Role) {
        let event = {
            let mut state = self.state.write().await;
            state.policy.renounce_role(caller, role)
        };
        self.publish_role_change(event);
    }

    fn publish_role_change(&self, event: Option<RegistryEvent>) {
        if let Some(event) = event {
            info!("Role membership changed: {:?}", event);
            self.events.publish(event);
        }
    }
}
