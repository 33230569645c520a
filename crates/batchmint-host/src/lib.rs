//! # batchmint-host
//!
//! An in-memory stand-in for the chain the pool runs on.
//!
//! [`InMemoryChain`] implements [`TokenHost`](batchmint_types::TokenHost),
//! [`WrapperHost`](batchmint_types::WrapperHost) and
//! [`Checkpoint`](batchmint_types::Checkpoint):
//!
//! - **Tokens**: ERC-20-like balances and allowances, with DAI-style permits
//!   (sequential nonces, `allowed` grants an unlimited allowance)
//! - **Wrappers**: mint shares against pulled underlying at an exchange rate
//!   and report their governance tokens
//! - **Clock**: a settable block time for permit deadlines
//!
//! Used by the engine's tests and by anything embedding the pool without a
//! real chain.

pub mod chain;
pub mod token;
pub mod wrapper;

pub use chain::InMemoryChain;
pub use token::{TokenLedger, UNLIMITED_ALLOWANCE};
pub use wrapper::{ExchangeRate, WrapperMarket};
