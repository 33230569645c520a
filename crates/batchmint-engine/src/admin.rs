//! Administrative control and the governance-token sweep.

use batchmint_types::{
    Address, BatchMintError, BatchMintEvent, Result, SweptToken, WrapperHost,
};
use tracing::{debug, info};

use crate::state::PoolState;

pub(crate) fn pause(state: &mut PoolState, caller: Address) -> Result<()> {
    state.ensure_owner(caller)?;
    state.ensure_not_paused()?;
    state.paused = true;
    state.emit(BatchMintEvent::Paused { by: caller });
    info!(by = %caller, "Pool paused");
    Ok(())
}

pub(crate) fn unpause(state: &mut PoolState, caller: Address) -> Result<()> {
    state.ensure_owner(caller)?;
    if !state.paused {
        return Err(BatchMintError::NotPaused);
    }
    state.paused = false;
    state.emit(BatchMintEvent::Unpaused { by: caller });
    info!(by = %caller, "Pool unpaused");
    Ok(())
}

pub(crate) fn init_trusted_forwarder(
    state: &mut PoolState,
    caller: Address,
    version: &str,
    forwarder: Address,
) -> Result<()> {
    state.ensure_owner(caller)?;
    install_forwarder(state, version, forwarder)
}

/// Install the trusted forwarder without an owner check. Used at initialization.
pub(crate) fn install_forwarder(
    state: &mut PoolState,
    version: &str,
    forwarder: Address,
) -> Result<()> {
    state.authorizer.init_trusted_forwarder(version, forwarder)?;
    state.emit(BatchMintEvent::TrustedForwarderInitialized {
        forwarder,
        version: version.to_string(),
    });
    info!(forwarder = %forwarder, version, "Trusted forwarder initialized");
    Ok(())
}

pub(crate) fn transfer_ownership(
    state: &mut PoolState,
    caller: Address,
    new_owner: Address,
) -> Result<()> {
    state.ensure_owner(caller)?;
    if new_owner.is_zero() {
        return Err(BatchMintError::InvalidOwner);
    }
    let previous = state.owner;
    state.owner = new_owner;
    state.emit(BatchMintEvent::OwnershipTransferred {
        previous,
        new_owner,
    });
    info!(previous = %previous, new_owner = %new_owner, "Ownership transferred");
    Ok(())
}

pub(crate) fn sweep_gov_tokens<H: WrapperHost>(
    state: &mut PoolState,
    host: &mut H,
) -> Result<Vec<SweptToken>> {
    state.ensure_not_paused()?;
    let swept = sweep_to_treasury(state, host)?;
    record_sweep(state, &swept);
    Ok(swept)
}

/// Move the pool's whole balance of every governance token the wrapper
/// reports to the fee treasury. Touches only the host.
///
/// Zero balances are skipped. The underlying and the wrapper itself are
/// never swept even if reported.
pub(crate) fn sweep_to_treasury<H: WrapperHost>(
    state: &PoolState,
    host: &mut H,
) -> Result<Vec<SweptToken>> {
    let pool = state.pool();
    let treasury = state.fee_treasury;
    let mut swept = Vec::new();

    for token in host.gov_tokens(state.wrapper) {
        if token == state.underlying || token == state.wrapper {
            debug!(token = %token, "Skipping pooled token reported as governance token");
            continue;
        }
        let amount = host.balance_of(token, pool);
        if amount == 0 {
            continue;
        }
        host.transfer(token, pool, treasury, amount)?;
        swept.push(SweptToken { token, amount });
    }
    Ok(swept)
}

pub(crate) fn record_sweep(state: &mut PoolState, swept: &[SweptToken]) {
    let treasury = state.fee_treasury;
    for &SweptToken { token, amount } in swept {
        state.emit(BatchMintEvent::GovTokenSwept {
            token,
            treasury,
            amount,
        });
    }
    info!(
        treasury = %treasury,
        tokens = swept.len(),
        "Governance tokens swept"
    );
}
