//! All-or-nothing call execution.
//!
//! Pool state is never copied. A call works on the live state and a host
//! checkpoint, under one rule: every fallible step comes before the pool
//! state changes it commits, and each ledger or authorizer mutation either
//! applies fully or fails leaving it untouched. On failure the host is
//! restored and events emitted by the call are truncated away, so neither
//! ledger changes, token movements nor events of the failed call survive.
//!
//! A withdrawal is the one call that changes the ledger before its last
//! fallible step. It reinstates its own claim when the payout fails.

use batchmint_types::{Checkpoint, Result};
use tracing::warn;

use crate::state::PoolState;

/// Run a call that may move tokens on `host`.
pub(crate) fn transact<H, T, F>(
    state: &mut PoolState,
    host: &mut H,
    op: &'static str,
    call: F,
) -> Result<T>
where
    H: Checkpoint,
    F: FnOnce(&mut PoolState, &mut H) -> Result<T>,
{
    let snapshot = host.checkpoint();
    let emitted = state.events.len();
    match call(state, host) {
        Ok(value) => Ok(value),
        Err(err) => {
            host.restore(snapshot);
            state.events.truncate(emitted);
            warn!(op, error = %err, "Call reverted");
            Err(err)
        }
    }
}

/// Run a call that only touches pool state.
pub(crate) fn update<T, F>(state: &mut PoolState, op: &'static str, call: F) -> Result<T>
where
    F: FnOnce(&mut PoolState) -> Result<T>,
{
    let emitted = state.events.len();
    match call(state) {
        Ok(value) => Ok(value),
        Err(err) => {
            state.events.truncate(emitted);
            warn!(op, error = %err, "Call reverted");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use batchmint_host::InMemoryChain;
    use batchmint_types::{Address, BatchMintError, BatchMintEvent, TokenHost};

    use super::*;

    fn setup() -> (PoolState, InMemoryChain, Address) {
        let mut chain = InMemoryChain::new();
        let dai = chain.deploy_token("DAI");
        let state = PoolState::new(
            Address::from_label("pool"),
            Address::from_label("owner"),
            dai,
            Address::from_label("idleDAI"),
            Address::from_label("treasury"),
        );
        (state, chain, dai)
    }

    #[test]
    fn success_commits_state_and_host() {
        let (mut state, mut chain, dai) = setup();
        let alice = Address::from_label("alice");
        transact(&mut state, &mut chain, "test", |s, h| {
            h.mint(dai, alice, 10)?;
            s.paused = true;
            s.emit(BatchMintEvent::Paused { by: alice });
            Ok(())
        })
        .unwrap();
        assert!(state.paused);
        assert_eq!(state.events.len(), 1);
        assert_eq!(chain.balance_of(dai, alice), 10);
    }

    #[test]
    fn failure_discards_host_and_events() {
        let (mut state, mut chain, dai) = setup();
        let alice = Address::from_label("alice");
        state.emit(BatchMintEvent::Unpaused { by: alice });
        let before = state.clone();
        let err = transact(&mut state, &mut chain, "test", |s, h| {
            h.mint(dai, alice, 10)?;
            s.emit(BatchMintEvent::Paused { by: alice });
            Err::<(), _>(BatchMintError::Internal("late failure".into()))
        })
        .unwrap_err();
        assert!(matches!(err, BatchMintError::Internal(_)));
        assert_eq!(state, before);
        assert_eq!(chain.balance_of(dai, alice), 0);
    }

    #[test]
    fn update_failure_drops_its_events() {
        let (mut state, _, _) = setup();
        let before = state.clone();
        let result: Result<()> = update(&mut state, "test", |s| {
            s.emit(BatchMintEvent::Paused {
                by: Address::from_label("owner"),
            });
            Err(BatchMintError::NotPaused)
        });
        assert!(result.is_err());
        assert_eq!(state, before);
    }
}
