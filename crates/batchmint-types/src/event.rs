//! Events emitted by the pool.
//!
//! Events form an append-only audit trail on the pool state. They are part
//! of the call's effects, so a reverted call emits nothing.

use serde::{Deserialize, Serialize};

use crate::{AdmissionPath, Address, Amount, BatchIndex};

/// Something that happened inside a committed pool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchMintEvent {
    Deposited {
        depositor: Address,
        batch: BatchIndex,
        amount: Amount,
        path: AdmissionPath,
    },
    BatchExecuted {
        batch: BatchIndex,
        total_deposited: Amount,
        total_minted: Amount,
    },
    Withdrawn {
        user: Address,
        batch: BatchIndex,
        amount: Amount,
    },
    GovTokenSwept {
        token: Address,
        treasury: Address,
        amount: Amount,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    TrustedForwarderInitialized {
        forwarder: Address,
        version: String,
    },
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
}
