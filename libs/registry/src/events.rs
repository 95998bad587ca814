//! Registry notifications

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::auth::Role;
use crate::types::FeedAssignment;

/// Buffered events per subscriber before lagging subscribers start losing them
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Auditable change emitted by a committed registry call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// One entry per affected pair; a zero feed marks a removal
    FeedsModified { feeds: Vec<FeedAssignment> },

    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },

    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },

    PendingGovernorSet {
        governor: Address,
        pending_governor: Address,
    },

    GovernorAccepted { governor: Address },

    DustSent {
        token: Address,
        amount: U256,
        recipient: Address,
    },
}

/// Fan-out of registry events to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, event: RegistryEvent) {
        if self.sender.send(event).is_err() {
            debug!("Registry event dropped: no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
