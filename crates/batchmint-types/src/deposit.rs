//! Validated deposits produced by the authorization layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// How a deposit was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionPath {
    /// Pull-transfer against an allowance the caller already granted.
    Direct,
    /// Allowance established by a signed permit in the same call.
    Permit,
    /// Submitted by the trusted forwarder on behalf of a signer.
    Relayed,
    /// Relayed and permit-authorized.
    RelayedPermit,
}

impl fmt::Display for AdmissionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Permit => write!(f, "PERMIT"),
            Self::Relayed => write!(f, "RELAYED"),
            Self::RelayedPermit => write!(f, "RELAYED_PERMIT"),
        }
    }
}

/// A deposit whose funds are already held by the pool.
///
/// The ledger accepts only this type, so every path into the ledger goes
/// through the authorization layer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDeposit {
    /// The effective depositor: the caller, or the relay signer.
    pub depositor: Address,
    /// Underlying pulled into the pool.
    pub amount: Amount,
    pub path: AdmissionPath,
}
