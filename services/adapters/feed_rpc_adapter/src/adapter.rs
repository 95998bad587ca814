//! Feed Registry Adapter
//!
//! Turns a resolved deployment plan into a live registry handle backed by RPC,
//! and answers read queries against it. Fresh deployments get a local registry
//! seeded from configuration; pinned deployments are read through the canonical
//! registry contract.

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, I256, U256};
use feed_registry::{
    AuthorizationPolicy, FeedAssignment, FeedRegistry, Governor, RegistryError, RoleHierarchy,
    RoundData, TokenLedger,
};
use registry_config::{DeploymentPlan, PolicyPlan};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::config::RpcAdapterConfig;
use crate::error::{AdapterError, Result};
use crate::ledger::{ReadOnlyLedger, RpcTokenLedger};
use crate::remote::RemoteRegistry;
use crate::rpc_client::{RpcFeedClient, MAX_ROUND_ID};

type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Pair-keyed read surface shared by local and pinned registries
#[async_trait]
pub trait RegistryReads: Send + Sync {
    async fn decimals(&self, base: Address, quote: Address) -> RegistryResult<u8>;
    async fn description(&self, base: Address, quote: Address) -> RegistryResult<String>;
    async fn version(&self, base: Address, quote: Address) -> RegistryResult<U256>;
    async fn latest_round_data(&self, base: Address, quote: Address) -> RegistryResult<RoundData>;
    async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: u128,
    ) -> RegistryResult<RoundData>;
    async fn latest_answer(&self, base: Address, quote: Address) -> RegistryResult<I256>;
    async fn latest_timestamp(&self, base: Address, quote: Address) -> RegistryResult<U256>;
    async fn latest_round(&self, base: Address, quote: Address) -> RegistryResult<U256>;
    async fn get_answer(&self, base: Address, quote: Address, round_id: U256)
        -> RegistryResult<I256>;
    async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> RegistryResult<U256>;
    async fn current_aggregator(&self, base: Address, quote: Address) -> RegistryResult<Address>;
}

#[async_trait]
impl<P: AuthorizationPolicy> RegistryReads for FeedRegistry<P> {
    async fn decimals(&self, base: Address, quote: Address) -> RegistryResult<u8> {
        FeedRegistry::decimals(self, base, quote).await
    }

    async fn description(&self, base: Address, quote: Address) -> RegistryResult<String> {
        FeedRegistry::description(self, base, quote).await
    }

    async fn version(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        FeedRegistry::version(self, base, quote).await
    }

    async fn latest_round_data(&self, base: Address, quote: Address) -> RegistryResult<RoundData> {
        FeedRegistry::latest_round_data(self, base, quote).await
    }

    async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: u128,
    ) -> RegistryResult<RoundData> {
        FeedRegistry::get_round_data(self, base, quote, round_id).await
    }

    async fn latest_answer(&self, base: Address, quote: Address) -> RegistryResult<I256> {
        FeedRegistry::latest_answer(self, base, quote).await
    }

    async fn latest_timestamp(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        FeedRegistry::latest_timestamp(self, base, quote).await
    }

    async fn latest_round(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        FeedRegistry::latest_round(self, base, quote).await
    }

    async fn get_answer(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> RegistryResult<I256> {
        FeedRegistry::get_answer(self, base, quote, round_id).await
    }

    async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> RegistryResult<U256> {
        FeedRegistry::get_timestamp(self, base, quote, round_id).await
    }

    async fn current_aggregator(&self, base: Address, quote: Address) -> RegistryResult<Address> {
        FeedRegistry::current_aggregator(self, base, quote).await
    }
}

#[async_trait]
impl RegistryReads for RemoteRegistry<Provider<Http>> {
    async fn decimals(&self, base: Address, quote: Address) -> RegistryResult<u8> {
        Ok(RemoteRegistry::decimals(self, base, quote).await?)
    }

    async fn description(&self, base: Address, quote: Address) -> RegistryResult<String> {
        Ok(RemoteRegistry::description(self, base, quote).await?)
    }

    async fn version(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        Ok(RemoteRegistry::version(self, base, quote).await?)
    }

    async fn latest_round_data(&self, base: Address, quote: Address) -> RegistryResult<RoundData> {
        Ok(RemoteRegistry::latest_round_data(self, base, quote).await?)
    }

    async fn get_round_data(
        &self,
        base: Address,
        quote: Address,
        round_id: u128,
    ) -> RegistryResult<RoundData> {
        Ok(RemoteRegistry::get_round_data(self, base, quote, round_id).await?)
    }

    async fn latest_answer(&self, base: Address, quote: Address) -> RegistryResult<I256> {
        Ok(RemoteRegistry::latest_answer(self, base, quote).await?)
    }

    async fn latest_timestamp(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        Ok(RemoteRegistry::latest_timestamp(self, base, quote).await?)
    }

    async fn latest_round(&self, base: Address, quote: Address) -> RegistryResult<U256> {
        Ok(RemoteRegistry::latest_round(self, base, quote).await?)
    }

    async fn get_answer(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> RegistryResult<I256> {
        Ok(RemoteRegistry::get_answer(self, base, quote, round_id).await?)
    }

    async fn get_timestamp(
        &self,
        base: Address,
        quote: Address,
        round_id: U256,
    ) -> RegistryResult<U256> {
        Ok(RemoteRegistry::get_timestamp(self, base, quote, round_id).await?)
    }

    async fn current_aggregator(&self, base: Address, quote: Address) -> RegistryResult<Address> {
        Ok(RemoteRegistry::get_feed(self, base, quote).await?)
    }
}

/// Read operation selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReadMethod {
    Decimals,
    Description,
    Version,
    LatestRoundData,
    GetRoundData,
    LatestAnswer,
    LatestTimestamp,
    LatestRound,
    GetAnswer,
    GetTimestamp,
    CurrentAggregator,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadQuery {
    pub base: Address,
    pub quote: Address,
    pub method: ReadMethod,
    pub round: Option<U256>,
}

impl ReadQuery {
    fn round(&self) -> Result<U256> {
        self.round.ok_or(AdapterError::MissingArgument("round"))
    }

    /// Round id for `getRoundData`, which takes a `uint80`
    fn round_id(&self) -> Result<u128> {
        let round = self.round()?;
        if round > U256::from(MAX_ROUND_ID) {
            return Err(AdapterError::InvalidArgument {
                name: "round",
                reason: format!("{} exceeds uint80", round),
            });
        }
        Ok(round.as_u128())
    }
}

/// Answer `query` as JSON
pub async fn query(reads: &dyn RegistryReads, query: &ReadQuery) -> Result<Value> {
    let (base, quote) = (query.base, query.quote);

    let value = match query.method {
        ReadMethod::Decimals => json!(reads.decimals(base, quote).await?),
        ReadMethod::Description => json!(reads.description(base, quote).await?),
        ReadMethod::Version => json!(reads.version(base, quote).await?.to_string()),
        ReadMethod::LatestRoundData => round_json(&reads.latest_round_data(base, quote).await?),
        ReadMethod::GetRoundData => {
            let round_id = query.round_id()?;
            round_json(&reads.get_round_data(base, quote, round_id).await?)
        }
        ReadMethod::LatestAnswer => json!(reads.latest_answer(base, quote).await?.to_string()),
        ReadMethod::LatestTimestamp => {
            json!(reads.latest_timestamp(base, quote).await?.to_string())
        }
        ReadMethod::LatestRound => json!(reads.latest_round(base, quote).await?.to_string()),
        ReadMethod::GetAnswer => {
            json!(reads.get_answer(base, quote, query.round()?).await?.to_string())
        }
        ReadMethod::GetTimestamp => {
            json!(reads
                .get_timestamp(base, quote, query.round()?)
                .await?
                .to_string())
        }
        ReadMethod::CurrentAggregator => {
            json!(format!("{:?}", reads.current_aggregator(base, quote).await?))
        }
    };

    Ok(value)
}

fn round_json(round: &RoundData) -> Value {
    json!({
        "roundId": round.round_id.to_string(),
        "answer": round.answer.to_string(),
        "startedAt": round.started_at.to_string(),
        "updatedAt": round.updated_at.to_string(),
        "answeredInRound": round.answered_in_round.to_string(),
    })
}

/// Live registry for one network
pub enum RegistryHandle {
    Governed(FeedRegistry<Governor>),
    Roles(FeedRegistry<RoleHierarchy>),
    Pinned(RemoteRegistry<Provider<Http>>),
}

impl RegistryHandle {
    pub fn reads(&self) -> &dyn RegistryReads {
        match self {
            RegistryHandle::Governed(registry) => registry,
            RegistryHandle::Roles(registry) => registry,
            RegistryHandle::Pinned(registry) => registry,
        }
    }
}

/// Build the registry described by `plan` on top of the configured RPC endpoint
pub async fn connect(plan: &DeploymentPlan, config: &RpcAdapterConfig) -> Result<RegistryHandle> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| {
        AdapterError::Provider {
            url: config.rpc_url.clone(),
            reason: e.to_string(),
        }
    })?;
    let provider = Arc::new(provider);

    match plan {
        DeploymentPlan::Pinned { name, address } => {
            info!("{} pinned at {:?}", name, address);
            Ok(RegistryHandle::Pinned(RemoteRegistry::new(*address, provider)?))
        }
        DeploymentPlan::Fresh {
            name,
            salt,
            policy,
            feeds,
        } => {
            let feed_client = Arc::new(RpcFeedClient::new(provider.clone())?);
            let ledger = build_ledger(provider.as_ref().clone(), config)?;
            let seed: Vec<FeedAssignment> = feeds
                .iter()
                .map(|f| FeedAssignment::new(f.base, f.quote, f.feed))
                .collect();

            info!(
                "Deploying {} (salt {}) with {} seed feeds",
                name,
                salt,
                seed.len()
            );

            let handle = match policy {
                PolicyPlan::Governor(governor) => RegistryHandle::Governed(
                    FeedRegistry::seeded(
                        Governor::new(*governor)?,
                        feed_client,
                        ledger,
                        &seed,
                    )
                    .await?,
                ),
                PolicyPlan::Roles {
                    super_admin,
                    admins,
                } => RegistryHandle::Roles(
                    FeedRegistry::seeded(
                        RoleHierarchy::new(
                            *super_admin,
                            admins.iter().copied(),
                        )?,
                        feed_client,
                        ledger,
                        &seed,
                    )
                    .await?,
                ),
            };
            Ok(handle)
        }
    }
}

fn build_ledger(provider: Provider<Http>, config: &RpcAdapterConfig) -> Result<Arc<dyn TokenLedger>> {
    let Some(key) = &config.private_key else {
        return Ok(Arc::new(ReadOnlyLedger));
    };

    let wallet = key
        .parse::<LocalWallet>()
        .map_err(|e| AdapterError::InvalidKey(e.to_string()))?
        .with_chain_id(config.chain_id);
    info!("Recovery transfers signed by {:?}", wallet.address());

    let signer = SignerMiddleware::new(provider, wallet);
    Ok(Arc::new(RpcTokenLedger::new(Arc::new(signer))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_config::SeedFeed;

    fn config() -> RpcAdapterConfig {
        RpcAdapterConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 137,
            private_key: None,
        }
    }

    #[tokio::test]
    async fn test_connect_pinned() {
        let plan = DeploymentPlan::Pinned {
            name: "ChainlinkFeedRegistry".to_string(),
            address: Address::repeat_byte(0x47),
        };
        let handle = connect(&plan, &config()).await.unwrap();
        assert!(matches!(handle, RegistryHandle::Pinned(ref r) if r.address() == Address::repeat_byte(0x47)));
    }

    #[tokio::test]
    async fn test_connect_fresh_without_seed() {
        let plan = DeploymentPlan::Fresh {
            name: "ChainlinkFeedRegistry".to_string(),
            salt: "MF-Chainlink-Feed-Registry-V1".to_string(),
            policy: PolicyPlan::Roles {
                super_admin: Address::repeat_byte(0x11),
                admins: vec![Address::repeat_byte(0x11)],
            },
            feeds: Vec::new(),
        };
        let handle = connect(&plan, &config()).await.unwrap();

        let RegistryHandle::Roles(registry) = &handle else {
            panic!("expected a role-governed registry");
        };
        assert!(registry.assignments().await.is_empty());

        // Unassigned pairs fail before any RPC call is made
        let read = ReadQuery {
            base: Address::repeat_byte(0x01),
            quote: Address::repeat_byte(0x02),
            method: ReadMethod::Decimals,
            round: None,
        };
        let err = query(handle.reads(), &read).await.unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Registry(RegistryError::FeedNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_zero_governor() {
        let plan = DeploymentPlan::Fresh {
            name: "ChainlinkFeedRegistry".to_string(),
            salt: "salt".to_string(),
            policy: PolicyPlan::Governor(Address::zero()),
            feeds: vec![SeedFeed {
                base: Address::repeat_byte(1),
                quote: Address::repeat_byte(2),
                feed: Address::repeat_byte(3),
            }],
        };
        let result = connect(&plan, &config()).await;
        assert!(matches!(
            result,
            Err(AdapterError::Registry(RegistryError::InvalidConfiguration(_)))
        ));
    }

    #[tokio::test]
    async fn test_round_argument_required() {
        let plan = DeploymentPlan::Fresh {
            name: "ChainlinkFeedRegistry".to_string(),
            salt: "salt".to_string(),
            policy: PolicyPlan::Governor(Address::repeat_byte(9)),
            feeds: Vec::new(),
        };
        let handle = connect(&plan, &config()).await.unwrap();
        let read = ReadQuery {
            base: Address::repeat_byte(0x01),
            quote: Address::repeat_byte(0x02),
            method: ReadMethod::GetAnswer,
            round: None,
        };
        assert!(matches!(
            query(handle.reads(), &read).await,
            Err(AdapterError::MissingArgument("round"))
        ));
    }

    #[tokio::test]
    async fn test_round_id_beyond_uint80_is_rejected() {
        let plan = DeploymentPlan::Fresh {
            name: "ChainlinkFeedRegistry".to_string(),
            salt: "salt".to_string(),
            policy: PolicyPlan::Governor(Address::repeat_byte(9)),
            feeds: Vec::new(),
        };
        let handle = connect(&plan, &config()).await.unwrap();

        // 2^128 + 5 would read as round 5 if truncated
        for round in [U256::from(MAX_ROUND_ID) + 1, U256::from(u128::MAX) + 6] {
            let read = ReadQuery {
                base: Address::repeat_byte(0x01),
                quote: Address::repeat_byte(0x02),
                method: ReadMethod::GetRoundData,
                round: Some(round),
            };
            assert!(matches!(
                query(handle.reads(), &read).await,
                Err(AdapterError::InvalidArgument { name: "round", .. })
            ));
        }
    }

    #[test]
    fn test_round_json() {
        let value = round_json(&RoundData {
            round_id: 3,
            answer: I256::from_raw(U256::from(1500)),
            started_at: U256::from(10),
            updated_at: U256::from(11),
            answered_in_round: 3,
        });
        assert_eq!(value["roundId"], "3");
        assert_eq!(value["answer"], "1500");
        assert_eq!(value["updatedAt"], "11");
    }
}
