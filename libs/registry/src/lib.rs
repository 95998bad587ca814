//! Feed Registry
//!
//! Maps an ordered (base, quote) pair of asset addresses to a price feed and
//! forwards the full AggregatorV2V3 read surface to whichever feed is assigned,
//! so callers can treat the registry as a drop-in substitute for any single feed.
//!
//! # Architecture
//!
//! ```text
//! admin callers ──► AuthorizationPolicy ──► FeedDirectory ──► classify()
//!                                                │
//! public callers ─► FeedRegistry (facade) ───────┘──► FeedClient ──► feed
//! ```
//!
//! - [`auth`]: single governor or super-admin/admin role hierarchy
//! - [`directory`]: the mapping, with all-or-nothing batch assignment
//! - [`classify`]: proxy vs. terminal aggregator classification
//! - [`registry`]: the service object tying everything together
//! - [`treasury`]: recovery of tokens sent to the registry by mistake
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = FeedRegistry::with_roles(msig, [msig], feeds, ledger)?;
//! registry.assign(msig, LINK, USD, link_usd_feed).await?;
//! let round = registry.latest_round_data(LINK, USD).await?;
//! ```

pub mod auth;
pub mod classify;
pub mod directory;
pub mod error;
pub mod events;
pub mod feed;
pub mod registry;
pub mod treasury;
pub mod types;

// Re-export commonly used types
pub use auth::{AuthorizationPolicy, Governor, Role, RoleHierarchy};
pub use classify::{classify, Classification};
pub use directory::FeedDirectory;
pub use error::{RegistryError, Result};
pub use events::{EventBus, RegistryEvent};
pub use feed::{FeedCallError, FeedClient, FeedResult};
pub use registry::FeedRegistry;
pub use treasury::{TokenLedger, TransferError};
pub use types::{FeedAssignment, FeedRecord, PairKey, RoundData};
