//! System-wide constants for the BatchMint pool.

use crate::Address;

/// Fixed treasury that receives swept auxiliary reward tokens.
///
/// `0x69a62C24F16d4914a48919613e8eE330641Bcb94`
pub const FEE_TREASURY: Address = Address([
    0x69, 0xa6, 0x2c, 0x24, 0xf1, 0x6d, 0x49, 0x14, 0xa4, 0x89, 0x19, 0x61, 0x3e, 0x8e, 0xe3, 0x30,
    0x64, 0x1b, 0xcb, 0x94,
]);

/// Domain tag for deriving account addresses from ed25519 public keys.
pub const ADDRESS_DOMAIN_TAG: &[u8] = b"batchmint:address:v1:";

/// Domain tag for deriving labelled addresses (tokens, contracts).
pub const LABEL_DOMAIN_TAG: &[u8] = b"batchmint:label:v1:";

/// Domain tag prefixed to every permit signing payload.
pub const PERMIT_DOMAIN_TAG: &[u8] = b"batchmint:permit:v1:";

/// Domain tag prefixed to every forward-request signing payload.
pub const FORWARD_REQUEST_DOMAIN_TAG: &[u8] = b"batchmint:forward:v1:";

/// Length of an ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "BatchMint";
