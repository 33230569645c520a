//! Batch lifecycle types.
//!
//! A batch is open while it is the pool's current batch. Execution seals it:
//! the pooled underlying is minted into wrapper shares once, the minted total
//! is recorded, and the current index moves on.
//!
//! ```text
//!   ┌──────┐  execute_batch   ┌──────────┐
//!   │ OPEN ├─────────────────▶│ EXECUTED │
//!   └──────┘                  └──────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, BatchIndex};

/// Running totals of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of underlying pulled into this batch.
    pub total_deposited: Amount,
    /// Wrapper shares produced on execution. Zero until executed.
    pub total_minted: Amount,
}

/// Read-only view of a batch, including its derived execution flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub index: BatchIndex,
    pub total_deposited: Amount,
    pub total_minted: Amount,
    /// `index < current_batch_index`.
    pub executed: bool,
}

/// Outcome of one `execute_batch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// The batch that was sealed by this call.
    pub batch: BatchIndex,
    /// Underlying handed to the wrapper.
    pub total_deposited: Amount,
    /// Wrapper shares received.
    pub total_minted: Amount,
    /// Whether the auxiliary sweep ran as part of this call.
    pub swept: bool,
}

impl ExecutionReport {
    /// `true` if the batch had no deposits and nothing was minted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_deposited == 0
    }
}

/// One auxiliary token moved to the fee treasury by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweptToken {
    pub token: Address,
    pub amount: Amount,
}
