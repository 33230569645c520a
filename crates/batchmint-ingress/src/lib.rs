//! # batchmint-ingress
//!
//! **Authorization layer**: admits deposits into the pool and turns each
//! one into a [`ValidatedDeposit`](batchmint_types::ValidatedDeposit).
//!
//! ## Architecture
//!
//! 1. **ForwarderRegistry**: the single trusted forwarder and its version tag
//! 2. **SignerRecovery**: recovers the effective depositor of a relayed call
//! 3. **RelayNonces**: sequential per-signer nonces against relay replay
//! 4. **Authorizer**: runs one of the three admission paths and pulls funds
//!
//! ## Deposit Flow
//!
//! ```text
//! deposit            ─┐
//! permit_and_deposit ─┼─▶ Authorizer ─▶ pull underlying ─▶ ValidatedDeposit ─▶ BatchLedger
//! relayed (forwarder)─┘
//! ```
//!
//! The ledger never learns which path was taken beyond the recorded
//! [`AdmissionPath`](batchmint_types::AdmissionPath).

pub mod authorizer;
pub mod forwarder;
pub mod recovery;
pub mod relay_nonces;

pub use authorizer::{Authorizer, RelayAdmission};
pub use forwarder::{ForwarderRegistry, TrustedForwarder};
pub use recovery::{Ed25519SignerRecovery, ForwarderAttestedRecovery, SignerRecovery};
pub use relay_nonces::RelayNonces;
