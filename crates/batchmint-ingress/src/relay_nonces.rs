//! Sequential relay nonces per signer.
//!
//! Each signer's forward requests must carry nonces 0, 1, 2, … in order.
//! A captured request cannot be replayed, because its nonce has already
//! been consumed, and cannot be reordered ahead of an earlier one.

use std::collections::BTreeMap;

use batchmint_types::{Address, BatchMintError, Result};
use serde::{Deserialize, Serialize};

/// Tracks the next expected relay nonce for every signer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayNonces {
    next: BTreeMap<Address, u64>,
}

impl RelayNonces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The nonce `signer`'s next request must carry.
    #[must_use]
    pub fn next_nonce(&self, signer: Address) -> u64 {
        self.next.get(&signer).copied().unwrap_or(0)
    }

    /// Check that `nonce` is the one `signer` must use next.
    ///
    /// # Errors
    /// Returns `RelayNonceMismatch` if `nonce` isn't the next expected one.
    pub fn check(&self, signer: Address, nonce: u64) -> Result<()> {
        let expected = self.next_nonce(signer);
        if nonce != expected {
            return Err(BatchMintError::RelayNonceMismatch {
                signer,
                expected,
                actual: nonce,
            });
        }
        Ok(())
    }

    /// Consume a nonce that passed [`RelayNonces::check`].
    pub fn advance(&mut self, signer: Address, nonce: u64) {
        self.next.insert(signer, nonce + 1);
    }

    /// Number of signers seen so far.
    #[must_use]
    pub fn signer_count(&self) -> usize {
        self.next.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consume(nonces: &mut RelayNonces, signer: Address, nonce: u64) -> Result<()> {
        nonces.check(signer, nonce)?;
        nonces.advance(signer, nonce);
        Ok(())
    }

    #[test]
    fn sequential_nonces_accepted() {
        let mut nonces = RelayNonces::new();
        let alice = Address::from_label("alice");
        for n in 0..5 {
            consume(&mut nonces, alice, n).unwrap();
        }
        assert_eq!(nonces.next_nonce(alice), 5);
    }

    #[test]
    fn replay_rejected() {
        let mut nonces = RelayNonces::new();
        let alice = Address::from_label("alice");
        consume(&mut nonces, alice, 0).unwrap();
        let err = nonces.check(alice, 0).unwrap_err();
        assert!(matches!(
            err,
            BatchMintError::RelayNonceMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn check_alone_consumes_nothing() {
        let mut nonces = RelayNonces::new();
        let alice = Address::from_label("alice");
        nonces.check(alice, 0).unwrap();
        nonces.check(alice, 0).unwrap();
        assert_eq!(nonces.next_nonce(alice), 0);
        assert!(consume(&mut nonces, alice, 3).is_err());
        assert_eq!(nonces.signer_count(), 0);
    }

    #[test]
    fn signers_are_independent() {
        let mut nonces = RelayNonces::new();
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        consume(&mut nonces, alice, 0).unwrap();
        consume(&mut nonces, bob, 0).unwrap();
        consume(&mut nonces, alice, 1).unwrap();
        assert_eq!(nonces.next_nonce(alice), 2);
        assert_eq!(nonces.next_nonce(bob), 1);
        assert_eq!(nonces.signer_count(), 2);
    }
}
