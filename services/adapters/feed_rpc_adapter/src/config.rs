//! Configuration for the feed RPC adapter

use anyhow::{anyhow, Result};
use registry_config::NetworkSettings;
use serde::{Deserialize, Serialize};

/// Environment variable holding the key that signs recovery transfers
pub const PRIVATE_KEY_ENV: &str = "FEED_REGISTRY_PRIVATE_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcAdapterConfig {
    /// RPC endpoint
    pub rpc_url: String,

    /// Chain ID (137 for Polygon)
    pub chain_id: u64,

    /// Key of the account holding the registry's funds; reads work without it
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}

impl Default for RpcAdapterConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://polygon-rpc.com".to_string(),
            chain_id: 137,
            private_key: None,
        }
    }
}

impl RpcAdapterConfig {
    /// Build from a network's settings, taking the signing key from the environment
    pub fn from_network(name: &str, settings: &NetworkSettings) -> Result<Self> {
        let rpc_url = settings
            .rpc_url
            .clone()
            .ok_or_else(|| anyhow!("Network {} has no rpc_url", name))?;
        let chain_id = settings
            .chain_id
            .ok_or_else(|| anyhow!("Network {} has no chain_id", name))?;

        Ok(Self {
            rpc_url,
            chain_id,
            private_key: std::env::var(PRIVATE_KEY_ENV).ok(),
        })
    }
}
