//! Feed Registry Service
//!
//! Resolves the registry deployment for a network and answers pair-keyed
//! price reads against it.
//!
//! ```text
//! feed_registry_service resolve polygon
//! feed_registry_service query polygon <base> <quote> latest-round-data
//! feed_registry_service query polygon <base> <quote> get-answer 1234
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feed_rpc_adapter::{connect, query, ReadMethod, ReadQuery, RpcAdapterConfig};
use registry_config::{DeploymentPlan, RegistryConfig};

#[derive(Parser, Debug)]
#[command(name = "feed_registry_service")]
#[command(about = "Chainlink feed registry resolver and query tool")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/registry.toml")]
    config: PathBuf,

    /// Environment overlay (development, staging, production)
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how the registry is provided on a network
    Resolve {
        network: String,
    },
    /// Read a price value for a base/quote pair
    Query {
        network: String,
        base: Address,
        quote: Address,
        #[arg(value_enum)]
        method: ReadMethod,
        /// Round id for get-round-data, get-answer and get-timestamp (decimal)
        #[arg(value_parser = parse_round)]
        round: Option<U256>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = RegistryConfig::load(Some(args.config.as_path()), args.environment.as_deref())
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    config.expand_env_vars()?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.global.log_level)?)
        .init();

    match args.command {
        Command::Resolve { network } => {
            let plan = config.resolve(&network)?;
            print_plan(&network, &plan);
        }
        Command::Query {
            network,
            base,
            quote,
            method,
            round,
        } => {
            let plan = config.resolve(&network)?;
            let settings = config
                .network(&network)
                .with_context(|| format!("Network {} has no RPC settings", network))?;
            let rpc = RpcAdapterConfig::from_network(&network, settings)?;

            info!("Connecting to {} via {}", network, rpc.rpc_url);
            let handle = connect(&plan, &rpc).await?;

            let read = ReadQuery {
                base,
                quote,
                method,
                round,
            };
            let value = query(handle.reads(), &read).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// RUST_LOG when set, otherwise the configured level with registry debug output
fn log_filter(configured: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(configured)?.add_directive("feed_registry=debug".parse()?)),
    }
}

fn parse_round(value: &str) -> std::result::Result<U256, String> {
    U256::from_dec_str(value).map_err(|e| format!("invalid round id {}: {}", value, e))
}

fn print_plan(network: &str, plan: &DeploymentPlan) {
    match plan {
        DeploymentPlan::Pinned { name, address } => {
            println!("{}: {} pinned at {:?}", network, name, address);
        }
        DeploymentPlan::Fresh {
            name, salt, feeds, ..
        } => {
            println!(
                "{}: fresh {} (salt {}) seeded with {} feeds",
                network,
                name,
                salt,
                feeds.len()
            );
        }
    }
}
