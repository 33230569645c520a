//! # Permit: offline-signed allowance
//!
//! A `Permit` lets a holder grant an allowance on the underlying token
//! without sending an approval of their own. The pool submits the permit
//! and pulls the deposit in the same call.
//!
//! ## Security Properties
//!
//! - **Token-bound**: the payload commits to the token address
//! - **Spender-bound**: only the named spender receives the allowance
//! - **Nonce-bound**: the token tracks a sequential nonce per holder
//! - **Time-bound**: rejected once `deadline` has passed
//!
//! Verification itself belongs to the token; this module only defines the
//! message and its canonical signing payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, constants, signature};

/// The message a holder signs to grant an allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// The token whose allowance is granted.
    pub token: Address,
    /// The account granting the allowance.
    pub holder: Address,
    /// The account receiving the allowance.
    pub spender: Address,
    /// Holder's next permit nonce on `token`.
    pub nonce: u64,
    /// Last instant at which the permit is valid.
    pub deadline: DateTime<Utc>,
    /// `true` grants an unlimited allowance, `false` revokes it.
    pub allowed: bool,
}

impl Permit {
    /// Canonical signing payload for ed25519 verification.
    ///
    /// Format: `"batchmint:permit:v1:" || token || holder || spender || nonce || deadline || allowed`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(128);
        payload.extend_from_slice(constants::PERMIT_DOMAIN_TAG);
        payload.extend_from_slice(self.token.as_bytes());
        payload.extend_from_slice(self.holder.as_bytes());
        payload.extend_from_slice(self.spender.as_bytes());
        payload.extend_from_slice(&self.nonce.to_le_bytes());
        payload.extend_from_slice(&self.deadline.timestamp().to_le_bytes());
        payload.push(u8::from(self.allowed));
        payload
    }

    /// Returns `true` if the permit has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// A permit signature: the signer's public key plus the ed25519 signature.
///
/// The public key is carried alongside the signature because ed25519 does
/// not support key recovery; the token checks that it derives to the holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    pub public_key: [u8; 32],
    pub signature: Vec<u8>,
}

impl PermitSignature {
    /// The address controlled by the signing key.
    #[must_use]
    pub fn signer(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Whether this signature is valid for `permit`, signed by its holder.
    #[must_use]
    pub fn verifies(&self, permit: &Permit) -> bool {
        self.signer() == permit.holder
            && signature::verify_signature(
                &self.public_key,
                &permit.signing_payload(),
                &self.signature,
            )
    }
}
