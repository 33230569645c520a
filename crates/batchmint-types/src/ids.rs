//! Identifiers and amounts used throughout BatchMint.
//!
//! Accounts and tokens share one 20-byte [`Address`] space. Account
//! addresses are derived from an ed25519 public key, so a signature can be
//! tied back to the address that produced it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{BatchMintError, constants};

/// Token amount in the token's smallest unit.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account or token address.
///
/// Serialized as a `0x`-prefixed lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Derive the address controlled by an ed25519 public key.
    ///
    /// `address = SHA-256(tag || public_key)[12..32]`
    #[must_use]
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ADDRESS_DOMAIN_TAG);
        hasher.update(public_key);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Deterministic address for a labelled entity (tokens, contracts in tests).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::LABEL_DOMAIN_TAG);
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = BatchMintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| BatchMintError::Serialization(format!("Invalid address {s}: {e}")))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|_| {
            BatchMintError::Serialization(format!("Invalid address {s}: expected 20 bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// BatchIndex
// ---------------------------------------------------------------------------

/// Monotonically increasing batch identifier.
///
/// Batch `n` is open while the pool's current index is `n`, and executed
/// once the current index is past it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BatchIndex(pub u64);

impl BatchIndex {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_public_key_is_deterministic() {
        let a = Address::from_public_key(&[7u8; 32]);
        let b = Address::from_public_key(&[7u8; 32]);
        let c = Address::from_public_key(&[8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn address_hex_parse_with_and_without_prefix() {
        let addr = constants::FEE_TREASURY;
        let text = addr.to_string();
        assert_eq!(text, "0x69a62c24f16d4914a48919613e8ee330641bcb94");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(
            "69A62C24F16d4914a48919613e8eE330641Bcb94"
                .parse::<Address>()
                .unwrap(),
            addr
        );
    }

    #[test]
    fn address_parse_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let json = serde_json::to_string(&constants::FEE_TREASURY).unwrap();
        assert_eq!(json, "\"0x69a62c24f16d4914a48919613e8ee330641bcb94\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, constants::FEE_TREASURY);
    }

    #[test]
    fn labels_give_distinct_addresses() {
        assert_ne!(Address::from_label("DAI"), Address::from_label("idleDAI"));
        assert!(!Address::from_label("DAI").is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn batch_index_next_and_display() {
        assert_eq!(BatchIndex(0).next(), BatchIndex(1));
        assert_eq!(format!("{}", BatchIndex(41)), "batch:41");
    }
}
