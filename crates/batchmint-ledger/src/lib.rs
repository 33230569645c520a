//! # batchmint-ledger
//!
//! **Pure batch accounting for BatchMint.**
//!
//! The ledger is the compute plane of the pool. It records deposits against
//! the open batch, seals batches with their minted totals, and computes
//! pro-rata claims. It has:
//!
//! - **Zero side effects**: no token movement, no authorization, no logging
//!   of user-facing events
//! - **Checked arithmetic**: overflow is an error, never a wrap
//! - **Audit-ability**: entries are zeroed, never deleted

pub mod distribution;
pub mod ledger;

pub use distribution::{mul_div_floor, pro_rata_share};
pub use ledger::{BatchLedger, Claim};
