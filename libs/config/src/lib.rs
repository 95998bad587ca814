//! # Feed Registry Configuration
//!
//! Configuration loading and deployment resolution for the feed registry.
//!
//! ## Features
//!
//! - **Layered loading**: base TOML file, optional environment overlay,
//!   `FEED_REGISTRY__` environment variables
//! - **Deployment resolution**: pinned canonical address vs. fresh deployment per
//!   network, with seed feeds and authorization identities
//!
//! ## Usage
//!
//! ```rust,no_run
//! use registry_config::{load_config, DeploymentPlan};
//!
//! let config = load_config(Some("production")).unwrap();
//! match config.resolve("polygon").unwrap() {
//!     DeploymentPlan::Pinned { address, .. } => println!("using {:?}", address),
//!     DeploymentPlan::Fresh { feeds, .. } => println!("seeding {} feeds", feeds.len()),
//! }
//! ```

pub mod deployment;
pub mod registry_config;

// Re-export commonly used types
pub use deployment::{parse_address, DeploymentPlan, PolicyPlan, SeedFeed};
pub use registry_config::{load_config, NetworkSettings, RegistryConfig};
