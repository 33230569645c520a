//! Relayed (meta-transaction) call types.
//!
//! A user who holds no gas signs a [`ForwardRequest`]; the trusted
//! forwarder submits it to the pool. The pool credits the request's signer,
//! never the forwarder that delivered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, PermitSignature, constants};

/// The pool operation a forward request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayedAction {
    /// Direct-pull deposit against an existing allowance.
    Deposit { amount: Amount },
    /// Permit-authorized deposit.
    PermitAndDeposit {
        amount: Amount,
        nonce: u64,
        deadline: DateTime<Utc>,
        permit_signature: PermitSignature,
    },
}

impl RelayedAction {
    /// The underlying amount this action deposits.
    #[must_use]
    pub fn amount(&self) -> Amount {
        match self {
            Self::Deposit { amount } | Self::PermitAndDeposit { amount, .. } => *amount,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Deposit { amount } => {
                out.push(0u8);
                out.extend_from_slice(&amount.to_le_bytes());
            }
            Self::PermitAndDeposit {
                amount,
                nonce,
                deadline,
                permit_signature,
            } => {
                out.push(1u8);
                out.extend_from_slice(&amount.to_le_bytes());
                out.extend_from_slice(&nonce.to_le_bytes());
                out.extend_from_slice(&deadline.timestamp().to_le_bytes());
                out.extend_from_slice(&permit_signature.public_key);
                out.extend_from_slice(&permit_signature.signature);
            }
        }
    }
}

/// A signed request for the forwarder to relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRequest {
    /// The claimed signer (effective depositor).
    pub from: Address,
    /// The pool contract the request is addressed to.
    pub recipient: Address,
    /// Signer's next relay nonce at the recipient.
    pub nonce: u64,
    pub action: RelayedAction,
    /// Signer's ed25519 public key.
    pub public_key: [u8; 32],
    /// Ed25519 signature over [`ForwardRequest::signing_payload`].
    pub signature: Vec<u8>,
}

impl ForwardRequest {
    /// Canonical signing payload.
    ///
    /// Format: `"batchmint:forward:v1:" || forwarder || recipient || from || nonce || action`
    #[must_use]
    pub fn signing_payload(&self, forwarder: Address) -> Vec<u8> {
        Self::payload_for(forwarder, self.recipient, self.from, self.nonce, &self.action)
    }

    /// Payload for a request that has not been signed yet.
    #[must_use]
    pub fn payload_for(
        forwarder: Address,
        recipient: Address,
        from: Address,
        nonce: u64,
        action: &RelayedAction,
    ) -> Vec<u8> {
        let mut payload = Vec::with_capacity(192);
        payload.extend_from_slice(constants::FORWARD_REQUEST_DOMAIN_TAG);
        payload.extend_from_slice(forwarder.as_bytes());
        payload.extend_from_slice(recipient.as_bytes());
        payload.extend_from_slice(from.as_bytes());
        payload.extend_from_slice(&nonce.to_le_bytes());
        action.encode_into(&mut payload);
        payload
    }
}
