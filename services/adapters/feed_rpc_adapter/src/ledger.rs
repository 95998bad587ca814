//! Token ledgers backing fund recovery
//!
//! The registry's holdings are the balances of the account whose key signs the
//! transfers.

use async_trait::async_trait;
use ethers::abi::parse_abi;
use ethers::contract::{BaseContract, Contract};
use ethers::providers::Middleware;
use ethers::types::{Address, U256, U64};
use feed_registry::{TokenLedger, TransferError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AdapterError, Result};

const ERC20_TRANSFER_ABI: &[&str] =
    &["function transfer(address to, uint256 amount) external returns (bool)"];

/// Sends ERC20 `transfer` transactions through a signing middleware
pub struct RpcTokenLedger<M> {
    client: Arc<M>,
    abi: BaseContract,
}

impl<M: Middleware + 'static> RpcTokenLedger<M> {
    pub fn new(client: Arc<M>) -> Result<Self> {
        let abi = parse_abi(ERC20_TRANSFER_ABI).map_err(|e| AdapterError::Abi(e.to_string()))?;
        Ok(Self {
            client,
            abi: BaseContract::from(abi),
        })
    }
}

#[async_trait]
impl<M: Middleware + 'static> TokenLedger for RpcTokenLedger<M> {
    async fn transfer(
        &self,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        let contract = Contract::<M>::new(token, self.abi.clone(), self.client.clone());
        let call = contract
            .method::<_, bool>("transfer", (recipient, amount))
            .map_err(|e| TransferError::Rejected {
                token,
                reason: e.to_string(),
            })?;

        let pending = call.send().await.map_err(|e| TransferError::Rejected {
            token,
            reason: e.to_string(),
        })?;
        let tx_hash = pending.tx_hash();

        let receipt = pending
            .await
            .map_err(|e| TransferError::Transport(e.to_string()))?
            .ok_or_else(|| TransferError::Transport(format!("transaction {:?} dropped", tx_hash)))?;

        if receipt.status != Some(U64::one()) {
            warn!("Transfer transaction {:?} failed", tx_hash);
            return Err(TransferError::Rejected {
                token,
                reason: format!("transaction {:?} reverted", tx_hash),
            });
        }

        info!("Transfer confirmed in {:?}", tx_hash);
        Ok(())
    }
}

/// Ledger for deployments without a signing key; every transfer is rejected
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOnlyLedger;

#[async_trait]
impl TokenLedger for ReadOnlyLedger {
    async fn transfer(
        &self,
        token: Address,
        _recipient: Address,
        _amount: U256,
    ) -> std::result::Result<(), TransferError> {
        Err(TransferError::Rejected {
            token,
            reason: "no signing key configured".to_string(),
        })
    }
}
