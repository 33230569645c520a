//! Error types for the BatchMint pool.
//!
//! All errors use the `BM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Access errors
//! - 2xx: Pause-state errors
//! - 3xx: Authorization errors (permits, relayed calls)
//! - 4xx: Funds / arithmetic errors
//! - 5xx: Administrative initialization errors
//! - 6xx: Collaborator (token host) errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, Amount};

/// Central error enum for all BatchMint operations.
///
/// Any error returned from a pool entry point means the whole call was
/// reverted: no ledger mutation and no token movement survived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchMintError {
    // =================================================================
    // Access Errors (1xx)
    // =================================================================
    /// A non-owner called an owner-gated operation.
    #[error("BM_ERR_100: Caller {caller} is not the owner")]
    NotOwner { caller: Address },

    /// Ownership cannot be handed to the zero address.
    #[error("BM_ERR_101: New owner is the zero address")]
    InvalidOwner,

    // =================================================================
    // Pause-State Errors (2xx)
    // =================================================================
    /// A gated operation was invoked while the pool is paused.
    #[error("BM_ERR_200: Pausable: paused")]
    Paused,

    /// `unpause` was invoked while the pool is not paused.
    #[error("BM_ERR_201: Pausable: not paused")]
    NotPaused,

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// The permit deadline has passed.
    #[error("BM_ERR_300: Permit expired")]
    PermitExpired,

    /// The permit signature didn't verify against the holder.
    #[error("BM_ERR_301: Permit signature verification failed")]
    PermitSignatureInvalid,

    /// The permit nonce doesn't match the holder's next nonce.
    #[error("BM_ERR_302: Permit nonce mismatch: expected {expected}, got {actual}")]
    PermitNonceMismatch { expected: u64, actual: u64 },

    /// The permit was signed by a key that doesn't control the holder address.
    #[error("BM_ERR_303: Permit holder mismatch")]
    PermitHolderMismatch,

    /// A relayed call arrived from an address that is not the trusted forwarder.
    #[error("BM_ERR_304: Untrusted forwarder: {0}")]
    UntrustedForwarder(Address),

    /// The forward request signature didn't verify.
    #[error("BM_ERR_305: Forward request signature verification failed")]
    RelaySignatureInvalid,

    /// The forward request nonce is not the signer's next nonce (replay).
    #[error("BM_ERR_306: Forward request nonce mismatch for {signer}: expected {expected}, got {actual}")]
    RelayNonceMismatch {
        signer: Address,
        expected: u64,
        actual: u64,
    },

    /// The forward request targets a different recipient contract.
    #[error("BM_ERR_307: Forward request recipient mismatch: {0}")]
    RelayRecipientMismatch(Address),

    // =================================================================
    // Funds Errors (4xx)
    // =================================================================
    /// Not enough balance to perform a transfer.
    #[error("BM_ERR_400: Insufficient balance of {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: Address,
        needed: Amount,
        available: Amount,
    },

    /// Not enough allowance to perform a pull-transfer.
    #[error("BM_ERR_401: Insufficient allowance of {token}: need {needed}, allowed {allowed}")]
    InsufficientAllowance {
        token: Address,
        needed: Amount,
        allowed: Amount,
    },

    /// Deposits must be strictly positive.
    #[error("BM_ERR_402: Amount must be greater than zero")]
    ZeroAmount,

    /// A checked arithmetic operation overflowed.
    #[error("BM_ERR_403: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    // =================================================================
    // Administrative Init Errors (5xx)
    // =================================================================
    /// The trusted forwarder was already initialized.
    #[error("BM_ERR_500: Trusted forwarder already initialized")]
    ForwarderAlreadyInitialized,

    // =================================================================
    // Collaborator Errors (6xx)
    // =================================================================
    /// The host has no token at this address.
    #[error("BM_ERR_600: Unknown token: {0}")]
    UnknownToken(Address),

    /// The wrapper token refused to mint.
    #[error("BM_ERR_601: Mint failed: {reason}")]
    MintFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error (broken invariant).
    #[error("BM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("BM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("BM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BatchMintError>;

impl From<serde_json::Error> for BatchMintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
