//! Persistent pool state.
//!
//! Everything a pool call may change lives in [`PoolState`]. Calls mutate
//! it in place; see `atomic` for how a failed call leaves it as it was.
//! New fields must be `#[serde(default)]` so older snapshots keep loading.

use batchmint_ingress::Authorizer;
use batchmint_ledger::BatchLedger;
use batchmint_types::{Address, BatchMintError, BatchMintEvent, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub(crate) owner: Address,
    pub(crate) paused: bool,
    pub(crate) underlying: Address,
    pub(crate) wrapper: Address,
    pub(crate) fee_treasury: Address,
    pub(crate) ledger: BatchLedger,
    pub(crate) authorizer: Authorizer,
    #[serde(default)]
    pub(crate) events: Vec<BatchMintEvent>,
}

impl PoolState {
    pub(crate) fn new(
        pool: Address,
        owner: Address,
        underlying: Address,
        wrapper: Address,
        fee_treasury: Address,
    ) -> Self {
        Self {
            owner,
            paused: false,
            underlying,
            wrapper,
            fee_treasury,
            ledger: BatchLedger::new(),
            authorizer: Authorizer::new(pool, underlying),
            events: Vec::new(),
        }
    }

    /// The pool contract's own address.
    pub(crate) fn pool(&self) -> Address {
        self.authorizer.pool()
    }

    pub(crate) fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(BatchMintError::NotOwner { caller })
        }
    }

    pub(crate) fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            Err(BatchMintError::Paused)
        } else {
            Ok(())
        }
    }

    pub(crate) fn emit(&mut self, event: BatchMintEvent) {
        self.events.push(event);
    }
}
