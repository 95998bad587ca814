//! # Feed RPC Adapter
//!
//! Connects the feed registry to an EVM chain over JSON-RPC.
//!
//! ## Architecture
//!
//! ```text
//! config/registry.toml → DeploymentPlan ─┬─ Pinned → RemoteRegistry (canonical contract)
//!                                        └─ Fresh  → FeedRegistry
//!                                                      ├─ RpcFeedClient  (aggregator/proxy reads)
//!                                                      └─ RpcTokenLedger (ERC20 dust recovery)
//! ```
//!
//! Both sides of the split answer the same pair-keyed reads through
//! [`RegistryReads`], which is what the `feed_registry_service` binary queries.

pub mod adapter;
pub mod config;
pub mod error;
pub mod ledger;
pub mod remote;
pub mod rpc_client;

pub use adapter::{connect, query, ReadMethod, ReadQuery, RegistryHandle, RegistryReads};
pub use config::{RpcAdapterConfig, PRIVATE_KEY_ENV};
pub use error::{AdapterError, Result};
pub use ledger::{ReadOnlyLedger, RpcTokenLedger};
pub use remote::RemoteRegistry;
pub use rpc_client::RpcFeedClient;
