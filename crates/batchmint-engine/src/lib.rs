//! # batchmint-engine
//!
//! The **BatchedMint** pool: collects underlying deposits into batches,
//! mints each batch into a yield-bearing wrapper once, and pays depositors
//! their pro-rata share of the mint.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────┐     ┌─────────────┐
//! deposit ──▶│  Authorizer  │────▶│ BatchLedger │◀── withdraw (pro-rata)
//!            └──────────────┘     └──────┬──────┘
//!                                        │ execute_batch
//!                                        ▼
//!                                 ┌─────────────┐
//!                                 │ WrapperHost │──▶ shares to pool
//!                                 └─────────────┘
//! ```
//!
//! - **Admission** lives in `batchmint-ingress`, accounting in
//!   `batchmint-ledger`; this crate wires them to a host
//! - **Atomicity**: every call checks before it changes [`PoolState`] and
//!   runs against a host checkpoint restored on failure
//! - **Admin control**: owner-gated pause and forwarder setup, plus a
//!   permissionless governance-token sweep to the fee treasury

mod admin;
mod atomic;
mod executor;
pub mod pool;
pub mod state;
mod withdrawal;

pub use pool::BatchedMint;
pub use state::PoolState;
