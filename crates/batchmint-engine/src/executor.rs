//! Batch execution.
//!
//! Closes the open batch: the pool's whole underlying balance is minted
//! into wrapper shares in one call, and the shares received are recorded
//! as the batch's minted total. Underlying that reached the pool outside a
//! deposit is minted along with the batch it lands in.
//!
//! ## Execution Flow
//!
//! 1. Pause check (anyone may execute)
//! 2. Non-empty batch: approve the wrapper for the pooled balance, mint,
//!    measure shares as the pool's wrapper balance delta
//! 3. Optionally sweep governance tokens to the treasury
//! 4. Seal the batch and open the next one (empty batches too)
//!
//! Steps 2 and 3 only move tokens on the host, so a failure in any step
//! leaves the ledger untouched.

use batchmint_types::{
    Amount, BatchMintError, BatchMintEvent, ExecutionReport, Result, WrapperHost,
};
use tracing::{debug, info, warn};

use crate::admin;
use crate::state::PoolState;

pub(crate) fn execute_batch<H: WrapperHost>(
    state: &mut PoolState,
    host: &mut H,
    sweep: bool,
) -> Result<ExecutionReport> {
    state.ensure_not_paused()?;

    let batch = state.ledger.current_batch_index();
    let total_deposited = state.ledger.batch_total(batch);
    let total_minted = if total_deposited > 0 {
        mint_pooled(state, host, total_deposited)?
    } else {
        0
    };
    let swept = if sweep {
        admin::sweep_to_treasury(state, host)?
    } else {
        Vec::new()
    };

    let summary = state.ledger.seal_current(total_minted)?;
    state.emit(BatchMintEvent::BatchExecuted {
        batch,
        total_deposited,
        total_minted,
    });
    info!(
        batch = batch.0,
        total_deposited = summary.total_deposited,
        total_minted = summary.total_minted,
        next = state.ledger.current_batch_index().0,
        "Batch executed"
    );
    if sweep {
        admin::record_sweep(state, &swept);
    }

    Ok(ExecutionReport {
        batch,
        total_deposited,
        total_minted,
        swept: sweep,
    })
}

/// Mint the pool's whole underlying balance and return the shares received.
fn mint_pooled<H: WrapperHost>(
    state: &PoolState,
    host: &mut H,
    total_deposited: Amount,
) -> Result<Amount> {
    let pool = state.pool();
    let pooled = host.balance_of(state.underlying, pool);
    if pooled != total_deposited {
        debug!(
            pooled,
            total_deposited, "Pooled underlying differs from recorded deposits"
        );
    }
    host.approve(state.underlying, pool, state.wrapper, pooled)?;

    let before = host.balance_of(state.wrapper, pool);
    let reported = host.mint_wrapped(state.wrapper, pool, pooled)?;
    let after = host.balance_of(state.wrapper, pool);

    let received = after
        .checked_sub(before)
        .ok_or_else(|| BatchMintError::MintFailed {
            reason: format!("wrapper balance fell from {before} to {after} during mint"),
        })?;
    if received != reported {
        warn!(
            reported,
            received, "Wrapper reported a different mint than the balance change"
        );
    }
    if received == 0 {
        warn!(pooled, "Batch minted no wrapper shares");
    }
    Ok(received)
}
