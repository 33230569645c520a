//! # batchmint-types
//!
//! Shared types, errors, and host interfaces for the **BatchMint** pool.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`BatchIndex`], [`Amount`]
//! - **Batch model**: [`BatchTotals`], [`BatchSummary`], [`ExecutionReport`], [`SweptToken`]
//! - **Deposit model**: [`ValidatedDeposit`], [`AdmissionPath`]
//! - **Permit model**: [`Permit`], [`PermitSignature`]
//! - **Relay model**: [`ForwardRequest`], [`RelayedAction`]
//! - **Events**: [`BatchMintEvent`]
//! - **Host interfaces**: [`TokenHost`], [`WrapperHost`], [`Checkpoint`]
//! - **Configuration**: [`BatchMintConfig`], [`ForwarderConfig`]
//! - **Errors**: [`BatchMintError`] with `BM_ERR_` prefix codes
//! - **Constants**: treasury address, domain tags, version

#[cfg(any(test, feature = "test-helpers"))]
pub mod account;
pub mod batch;
pub mod config;
pub mod constants;
pub mod deposit;
pub mod error;
pub mod event;
pub mod host;
pub mod ids;
pub mod permit;
pub mod relay;
pub mod signature;

// Re-export all primary types at crate root for ergonomic imports:
//   use batchmint_types::{Address, BatchIndex, Permit, TokenHost, ...};

#[cfg(any(test, feature = "test-helpers"))]
pub use account::*;
pub use batch::*;
pub use config::*;
pub use deposit::*;
pub use error::*;
pub use event::*;
pub use host::*;
pub use ids::*;
pub use permit::*;
pub use relay::*;

// Constants are accessed via `batchmint_types::constants::FOO`
// (not re-exported to avoid name collisions).
