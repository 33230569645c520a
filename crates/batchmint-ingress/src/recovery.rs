//! Signer recovery for relayed calls.
//!
//! The relay protocol decides who the effective depositor of a forwarded
//! call is. It lives behind [`SignerRecovery`] so the protocol can be
//! swapped without touching the ledger or the other admission paths.

use batchmint_types::{Address, BatchMintError, ForwardRequest, Result, signature};

/// Recovers the original signer of a forwarded request.
pub trait SignerRecovery {
    /// Return the address on whose behalf `forwarder` relayed `request`.
    ///
    /// `forwarder` has already been checked against the trusted forwarder.
    ///
    /// # Errors
    /// Returns `RelaySignatureInvalid` if the request doesn't prove its signer.
    fn recover_signer(&self, forwarder: Address, request: &ForwardRequest) -> Result<Address>;
}

/// Verifies an ed25519 signature over the request's signing payload.
///
/// The payload binds the forwarder, the recipient, the signer, the nonce and
/// the action, so a signature cannot be moved to another forwarder, pool or
/// amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519SignerRecovery;

impl SignerRecovery for Ed25519SignerRecovery {
    fn recover_signer(&self, forwarder: Address, request: &ForwardRequest) -> Result<Address> {
        if Address::from_public_key(&request.public_key) != request.from {
            return Err(BatchMintError::RelaySignatureInvalid);
        }
        let payload = request.signing_payload(forwarder);
        if !signature::verify_signature(&request.public_key, &payload, &request.signature) {
            return Err(BatchMintError::RelaySignatureInvalid);
        }
        Ok(request.from)
    }
}

/// Trusts the `from` field as attested by the trusted forwarder.
///
/// For forwarders that verify signatures themselves and only pass the
/// signer along (the appended-sender convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderAttestedRecovery;

impl SignerRecovery for ForwarderAttestedRecovery {
    fn recover_signer(&self, _forwarder: Address, request: &ForwardRequest) -> Result<Address> {
        if request.from.is_zero() {
            return Err(BatchMintError::RelaySignatureInvalid);
        }
        Ok(request.from)
    }
}
