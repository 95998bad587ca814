//! Authorization policies
//!
//! The registry is generic over an [`AuthorizationPolicy`]. Two policies exist:
//!
//! - [`Governor`]: a single identity holds every capability and can hand it over
//!   in two steps (propose, then accept).
//! - [`RoleHierarchy`]: a super-admin role that administers itself and the admin
//!   role; members of either role may mutate feeds and recover funds.
//!
//! Membership changes return the [`RegistryEvent`] to publish, or `None` when the
//! call changed nothing.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{RegistryError, Result};
use crate::events::RegistryEvent;

/// Decides who may mutate the directory and who may recover funds
pub trait AuthorizationPolicy: Send + Sync {
    fn is_authorized_to_mutate(&self, identity: Address) -> bool;

    fn is_authorized_to_recover_funds(&self, identity: Address) -> bool;
}

/// Single-governor policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Governor {
    governor: Address,
    pending_governor: Option<Address>,
}

impl Governor {
    pub fn new(governor: Address) -> Result<Self> {
        if governor.is_zero() {
            return Err(RegistryError::InvalidConfiguration(
                "governor cannot be the zero address".to_string(),
            ));
        }
        Ok(Self {
            governor,
            pending_governor: None,
        })
    }

    pub fn governor(&self) -> Address {
        self.governor
    }

    pub fn pending_governor(&self) -> Option<Address> {
        self.pending_governor
    }

    pub fn is_governor(&self, identity: Address) -> bool {
        identity == self.governor
    }

    /// Propose a new governor. Only the current governor may call this.
    pub fn set_pending_governor(
        &mut self,
        caller: Address,
        pending_governor: Address,
    ) -> Result<RegistryEvent> {
        if !self.is_governor(caller) {
            return Err(RegistryError::Unauthorized { caller });
        }
        self.pending_governor = Some(pending_governor);
        Ok(RegistryEvent::PendingGovernorSet {
            governor: self.governor,
            pending_governor,
        })
    }

    /// Complete the hand-over. Only the pending governor may call this.
    pub fn accept_pending_governor(&mut self, caller: Address) -> Result<RegistryEvent> {
        match self.pending_governor {
            Some(pending) if pending == caller => {
                self.governor = pending;
                self.pending_governor = None;
                Ok(RegistryEvent::GovernorAccepted { governor: pending })
            }
            _ => Err(RegistryError::Unauthorized { caller }),
        }
    }
}

impl AuthorizationPolicy for Governor {
    fn is_authorized_to_mutate(&self, identity: Address) -> bool {
        self.is_governor(identity)
    }

    fn is_authorized_to_recover_funds(&self, identity: Address) -> bool {
        self.is_governor(identity)
    }
}

/// Roles of the two-tier hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    Admin,
}

impl Role {
    /// Role whose members may grant and revoke this role
    pub fn admin_role(self) -> Role {
        match self {
            Role::SuperAdmin => Role::SuperAdmin,
            Role::Admin => Role::SuperAdmin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "SUPER_ADMIN_ROLE"),
            Role::Admin => write!(f, "ADMIN_ROLE"),
        }
    }
}

/// Two-tier role policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleHierarchy {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleHierarchy {
    pub fn new(super_admin: Address, admins: impl IntoIterator<Item = Address>) -> Result<Self> {
        if super_admin.is_zero() {
            return Err(RegistryError::InvalidConfiguration(
                "super admin cannot be the zero address".to_string(),
            ));
        }

        let mut hierarchy = Self::default();
        hierarchy.insert(Role::SuperAdmin, super_admin);
        for admin in admins {
            hierarchy.insert(Role::Admin, admin);
        }
        Ok(hierarchy)
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.members
            .get(&role)
            .map_or(false, |members| members.contains(&account))
    }

    pub fn role_admin(&self, role: Role) -> Role {
        role.admin_role()
    }

    /// Current members of a role, in no particular order
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<Option<RegistryEvent>> {
        self.check_role_admin(caller, role)?;
        if !self.insert(role, account) {
            return Ok(None);
        }
        Ok(Some(RegistryEvent::RoleGranted {
            role,
            account,
            sender: caller,
        }))
    }

    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<Option<RegistryEvent>> {
        self.check_role_admin(caller, role)?;
        Ok(self.remove(caller, role, account))
    }

    /// Give up the caller's own membership
    pub fn renounce_role(&mut self, caller: Address, role: Role) -> Option<RegistryEvent> {
        self.remove(caller, role, caller)
    }

    fn check_role_admin(&self, caller: Address, role: Role) -> Result<()> {
        if self.has_role(role.admin_role(), caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized { caller })
        }
    }

    fn insert(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    fn remove(&mut self, sender: Address, role: Role, account: Address) -> Option<RegistryEvent> {
        let removed = self
            .members
            .get_mut(&role)
            .map_or(false, |members| members.remove(&account));

        removed.then_some(RegistryEvent::RoleRevoked {
            role,
            account,
            sender,
        })
    }
}

impl AuthorizationPolicy for RoleHierarchy {
    fn is_authorized_to_mutate(&self, identity: Address) -> bool {
        self.has_role(Role::SuperAdmin, identity) || self.has_role(Role::Admin, identity)
    }

    fn is_authorized_to_recover_funds(&self, identity: Address) -> bool {
        self.is_authorized_to_mutate(identity)
    }
}
