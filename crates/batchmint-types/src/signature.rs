//! Ed25519 signature verification shared by permits and forward requests.

use ed25519_dalek::{Signature, VerifyingKey};

use crate::constants::SIGNATURE_LEN;

/// Verify an ed25519 `signature` over `payload` under `public_key`.
///
/// Returns `false` for malformed keys or signatures instead of erroring, so
/// callers map every failure onto their own domain error.
#[must_use]
pub fn verify_signature(public_key: &[u8; 32], payload: &[u8], signature: &[u8]) -> bool {
    if signature.len() != SIGNATURE_LEN {
        return false;
    }
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify_strict(payload, &sig).is_ok()
}
