//! Deployment resolution
//!
//! Decides, per network, whether the registry is an already-operated canonical
//! instance pinned at a known address or a fresh deployment seeded with
//! network-specific identities. Networks without their own entry get a fresh
//! deployment governed by the configured defaults.

use anyhow::{anyhow, Context, Result};
use ethers::types::Address;
use tracing::debug;

use crate::registry_config::{
    DeploymentMode, NetworkSettings, PolicyKind, PolicySettings, RegistryConfig,
};

/// Resolved authorization policy of a fresh deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyPlan {
    Governor(Address),
    Roles {
        super_admin: Address,
        admins: Vec<Address>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedFeed {
    pub base: Address,
    pub quote: Address,
    pub feed: Address,
}

/// What to do on a given network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentPlan {
    /// Register the canonical address under `name`
    Pinned { name: String, address: Address },
    /// Deploy a new instance under `name`
    Fresh {
        name: String,
        salt: String,
        policy: PolicyPlan,
        feeds: Vec<SeedFeed>,
    },
}

impl DeploymentPlan {
    pub fn name(&self) -> &str {
        match self {
            DeploymentPlan::Pinned { name, .. } | DeploymentPlan::Fresh { name, .. } => name,
        }
    }
}

impl RegistryConfig {
    /// Resolve the deployment plan for `network`
    pub fn resolve(&self, network: &str) -> Result<DeploymentPlan> {
        let name = self.registry.name.clone();

        let Some(settings) = self.network(network) else {
            debug!("No settings for network {}, using default deployment", network);
            return Ok(DeploymentPlan::Fresh {
                name,
                salt: self.registry.salt.clone(),
                policy: resolve_policy(&self.defaults)?,
                feeds: Vec::new(),
            });
        };

        match settings.mode {
            DeploymentMode::Pinned => {
                let address = settings
                    .address
                    .as_deref()
                    .ok_or_else(|| anyhow!("Pinned network {} has no address", network))?;
                Ok(DeploymentPlan::Pinned {
                    name,
                    address: parse_address(address)
                        .with_context(|| format!("Invalid pinned address for {}", network))?,
                })
            }
            DeploymentMode::Fresh => {
                let policy = settings.policy.as_ref().unwrap_or(&self.defaults);
                Ok(DeploymentPlan::Fresh {
                    name,
                    salt: self.registry.salt.clone(),
                    policy: resolve_policy(policy)
                        .with_context(|| format!("Invalid policy for {}", network))?,
                    feeds: resolve_feeds(settings)
                        .with_context(|| format!("Invalid seed feeds for {}", network))?,
                })
            }
        }
    }
}

fn resolve_policy(policy: &PolicySettings) -> Result<PolicyPlan> {
    match policy.kind {
        PolicyKind::Governor => {
            let governor = policy
                .governor
                .as_deref()
                .ok_or_else(|| anyhow!("Governor policy requires a governor"))?;
            Ok(PolicyPlan::Governor(parse_address(governor)?))
        }
        PolicyKind::Roles => {
            let super_admin = policy
                .super_admin
                .as_deref()
                .ok_or_else(|| anyhow!("Role policy requires a super_admin"))?;
            let admins = policy
                .admins
                .iter()
                .map(|admin| parse_address(admin))
                .collect::<Result<Vec<_>>>()?;
            Ok(PolicyPlan::Roles {
                super_admin: parse_address(super_admin)?,
                admins,
            })
        }
    }
}

fn resolve_feeds(settings: &NetworkSettings) -> Result<Vec<SeedFeed>> {
    settings
        .feeds
        .iter()
        .map(|feed| {
            Ok(SeedFeed {
                base: parse_address(&feed.base)?,
                quote: parse_address(&feed.quote)?,
                feed: parse_address(&feed.feed)?,
            })
        })
        .collect()
}

/// Parse a `0x`-prefixed (or bare) 40 hex digit address
pub fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .with_context(|| format!("Invalid address {}", value))
}
