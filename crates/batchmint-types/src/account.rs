//! Test accounts with real ed25519 keys. **Never use in production.**

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};

use crate::{
    Address, Amount, ForwardRequest, Permit, PermitSignature, RelayedAction,
};

/// A random key pair and the address it controls.
#[derive(Debug, Clone)]
pub struct TestAccount {
    signing_key: SigningKey,
}

impl TestAccount {
    /// Generate a fresh random account.
    #[must_use]
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    #[must_use]
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    /// Sign an arbitrary payload.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.signing_key.sign(payload).to_bytes().to_vec()
    }

    #[must_use]
    pub fn sign_permit(&self, permit: &Permit) -> PermitSignature {
        PermitSignature {
            public_key: self.public_key(),
            signature: self.sign(&permit.signing_payload()),
        }
    }

    /// Sign an unlimited-allowance permit for `spender` on `token`.
    #[must_use]
    pub fn permit_for(
        &self,
        token: Address,
        spender: Address,
        nonce: u64,
        deadline: DateTime<Utc>,
    ) -> PermitSignature {
        self.sign_permit(&Permit {
            token,
            holder: self.address(),
            spender,
            nonce,
            deadline,
            allowed: true,
        })
    }

    /// Build and sign a forward request addressed to `recipient` via `forwarder`.
    #[must_use]
    pub fn forward_request(
        &self,
        forwarder: Address,
        recipient: Address,
        nonce: u64,
        action: RelayedAction,
    ) -> ForwardRequest {
        let from = self.address();
        let payload = ForwardRequest::payload_for(forwarder, recipient, from, nonce, &action);
        ForwardRequest {
            from,
            recipient,
            nonce,
            action,
            public_key: self.public_key(),
            signature: self.sign(&payload),
        }
    }

    /// Shorthand for a relayed direct deposit.
    #[must_use]
    pub fn relayed_deposit(
        &self,
        forwarder: Address,
        recipient: Address,
        nonce: u64,
        amount: Amount,
    ) -> ForwardRequest {
        self.forward_request(forwarder, recipient, nonce, RelayedAction::Deposit { amount })
    }
}
