//! Registry Configuration Module
//!
//! Loads the registry configuration from TOML files with environment-specific
//! overrides and `FEED_REGISTRY__`-prefixed environment variables.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/registry.toml";

/// Directory holding `<environment>.toml` overlays
pub const ENVIRONMENTS_DIR: &str = "config/environments";

/// Prefix of environment variable overrides, e.g. `FEED_REGISTRY__GLOBAL__LOG_LEVEL`
pub const ENV_PREFIX: &str = "FEED_REGISTRY";

/// Main registry configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryConfig {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Name and salt the registry is published under
    #[serde(default)]
    pub registry: RegistryIdentity,

    /// Policy of fresh deployments on networks without their own
    pub defaults: PolicySettings,

    /// Per-network deployment settings
    #[serde(default)]
    pub networks: HashMap<String, NetworkSettings>,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GlobalConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryIdentity {
    pub name: String,
    pub salt: String,
}

/// How the registry comes to exist on a network
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Reuse an already-operated canonical registry
    Pinned,
    /// Deploy a new instance
    Fresh,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Governor,
    Roles,
}

/// Authorization policy of a fresh deployment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolicySettings {
    pub kind: PolicyKind,
    pub governor: Option<String>,
    pub super_admin: Option<String>,
    #[serde(default)]
    pub admins: Vec<String>,
}

/// One network's settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NetworkSettings {
    pub mode: DeploymentMode,
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,

    // Pinned deployments
    pub address: Option<String>,

    // Fresh deployments
    pub policy: Option<PolicySettings>,
    #[serde(default)]
    pub feeds: Vec<SeedFeedSettings>,

    pub description: Option<String>,
}

/// Initial assignment applied to a fresh deployment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeedFeedSettings {
    pub base: String,
    pub quote: String,
    pub feed: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for RegistryIdentity {
    fn default() -> Self {
        Self {
            name: "ChainlinkFeedRegistry".to_string(),
            salt: "MF-Chainlink-Feed-Registry-V1".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .map(|dir| dir.join("environments"))
                .unwrap_or_else(|| PathBuf::from(ENVIRONMENTS_DIR))
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Parse a configuration held in memory
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse registry configuration")
    }

    /// Get settings for a specific network
    pub fn network(&self, name: &str) -> Option<&NetworkSettings> {
        self.networks.get(name)
    }

    /// Expand environment variables in RPC URLs and identities
    pub fn expand_env_vars(&mut self) -> Result<()> {
        expand_policy(&mut self.defaults)?;

        for (name, network) in &mut self.networks {
            if let Some(rpc) = &network.rpc_url {
                let expanded = shellexpand::env(rpc)
                    .with_context(|| format!("Failed to expand RPC URL for {}", name))?;
                network.rpc_url = Some(expanded.to_string());
            }

            if let Some(address) = &network.address {
                let expanded = shellexpand::env(address)
                    .with_context(|| format!("Failed to expand address for {}", name))?;
                network.address = Some(expanded.to_string());
            }

            if let Some(policy) = &mut network.policy {
                expand_policy(policy)?;
            }
        }

        Ok(())
    }
}

fn expand_policy(policy: &mut PolicySettings) -> Result<()> {
    let expand = |value: &str| -> Result<String> {
        Ok(shellexpand::env(value)
            .context("Failed to expand policy identity")?
            .to_string())
    };

    if let Some(governor) = &policy.governor {
        policy.governor = Some(expand(governor)?);
    }
    if let Some(super_admin) = &policy.super_admin {
        policy.super_admin = Some(expand(super_admin)?);
    }
    policy.admins = policy
        .admins
        .iter()
        .map(|admin| expand(admin))
        .collect::<Result<_>>()?;
    Ok(())
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::load(None, environment)?;
    config.expand_env_vars()?;
    Ok(config)
}
