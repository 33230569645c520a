//! Pro-rata withdrawals from executed batches.
//!
//! The caller's entry is zeroed before any wrapper shares leave the pool.
//! Withdrawing from an open batch, or with nothing outstanding, is a no-op
//! that returns 0. A payout that fails reinstates the entry.

use batchmint_types::{Address, Amount, BatchIndex, BatchMintEvent, Result, TokenHost};
use tracing::debug;

use crate::state::PoolState;

pub(crate) fn withdraw<H: TokenHost>(
    state: &mut PoolState,
    host: &mut H,
    caller: Address,
    batch: BatchIndex,
) -> Result<Amount> {
    state.ensure_not_paused()?;

    // Effects: entry is zeroed inside `claim`
    let Some(claim) = state.ledger.claim(caller, batch)? else {
        debug!(user = %caller, batch = batch.0, "Nothing to withdraw");
        return Ok(0);
    };

    // Interaction
    if let Err(err) = host.transfer(state.wrapper, state.pool(), caller, claim.owed) {
        state.ledger.restore_claim(caller, &claim);
        return Err(err);
    }

    state.emit(BatchMintEvent::Withdrawn {
        user: caller,
        batch,
        amount: claim.owed,
    });
    debug!(
        user = %caller,
        batch = batch.0,
        share = claim.share,
        owed = claim.owed,
        "Withdrawal paid"
    );
    Ok(claim.owed)
}

#[cfg(test)]
mod tests {
    use batchmint_host::InMemoryChain;
    use batchmint_types::{AdmissionPath, BatchMintError, ValidatedDeposit};

    use super::*;

    struct Fixture {
        chain: InMemoryChain,
        state: PoolState,
        idle: Address,
        pool: Address,
    }

    /// Batch 0 executed with `deposits`, minting `minted` shares to the pool.
    fn executed(deposits: &[(&str, Amount)], minted: Amount) -> Fixture {
        let mut chain = InMemoryChain::new();
        let dai = chain.deploy_token("DAI");
        let idle = chain.deploy_wrapper("idleDAI", dai).unwrap();
        let pool = Address::from_label("pool");
        let mut state = PoolState::new(
            pool,
            Address::from_label("owner"),
            dai,
            idle,
            Address::from_label("treasury"),
        );
        for (user, amount) in deposits {
            state
                .ledger
                .record_deposit(&ValidatedDeposit {
                    depositor: Address::from_label(user),
                    amount: *amount,
                    path: AdmissionPath::Direct,
                })
                .unwrap();
        }
        chain.mint(idle, pool, minted).unwrap();
        state.ledger.seal_current(minted).unwrap();
        Fixture {
            chain,
            state,
            idle,
            pool,
        }
    }

    #[test]
    fn pays_proportional_share_once() {
        let mut f = executed(&[("user1", 10), ("user2", 5), ("user3", 6)], 21);
        let user1 = Address::from_label("user1");

        let paid = withdraw(&mut f.state, &mut f.chain, user1, BatchIndex(0)).unwrap();
        assert_eq!(paid, 10);
        assert_eq!(f.chain.balance_of(f.idle, user1), 10);
        assert_eq!(f.state.ledger.batch_deposit(user1, BatchIndex(0)), 0);

        let again = withdraw(&mut f.state, &mut f.chain, user1, BatchIndex(0)).unwrap();
        assert_eq!(again, 0);
        assert_eq!(f.chain.balance_of(f.idle, user1), 10);
    }

    #[test]
    fn rounding_dust_stays_in_pool() {
        let mut f = executed(&[("a", 1), ("b", 1), ("c", 1)], 10);
        for user in ["a", "b", "c"] {
            let paid =
                withdraw(&mut f.state, &mut f.chain, Address::from_label(user), BatchIndex(0))
                    .unwrap();
            assert_eq!(paid, 3);
        }
        assert_eq!(f.chain.balance_of(f.idle, f.pool), 1);
    }

    #[test]
    fn open_batch_is_noop() {
        let mut f = executed(&[("user1", 10)], 10);
        let paid = withdraw(
            &mut f.state,
            &mut f.chain,
            Address::from_label("user1"),
            BatchIndex(1),
        )
        .unwrap();
        assert_eq!(paid, 0);
        assert!(f.state.events.is_empty());
    }

    #[test]
    fn non_depositor_gets_nothing() {
        let mut f = executed(&[("user1", 10)], 10);
        let paid = withdraw(
            &mut f.state,
            &mut f.chain,
            Address::from_label("stranger"),
            BatchIndex(0),
        )
        .unwrap();
        assert_eq!(paid, 0);
        assert_eq!(f.chain.balance_of(f.idle, f.pool), 10);
    }

    #[test]
    fn paused_withdraw_rejected() {
        let mut f = executed(&[("user1", 10)], 10);
        f.state.paused = true;
        assert!(matches!(
            withdraw(
                &mut f.state,
                &mut f.chain,
                Address::from_label("user1"),
                BatchIndex(0)
            ),
            Err(BatchMintError::Paused)
        ));
    }

    #[test]
    fn failed_payout_reinstates_entry() {
        let mut f = executed(&[("user1", 10), ("user2", 10)], 20);
        let user1 = Address::from_label("user1");
        let elsewhere = Address::from_label("elsewhere");
        f.chain.transfer(f.idle, f.pool, elsewhere, 15).unwrap();
        let before = f.state.clone();

        let err = withdraw(&mut f.state, &mut f.chain, user1, BatchIndex(0)).unwrap_err();
        assert!(matches!(err, BatchMintError::InsufficientBalance { .. }));
        assert_eq!(f.state, before);
        assert_eq!(f.state.ledger.batch_deposit(user1, BatchIndex(0)), 10);

        f.chain.transfer(f.idle, elsewhere, f.pool, 15).unwrap();
        assert_eq!(
            withdraw(&mut f.state, &mut f.chain, user1, BatchIndex(0)).unwrap(),
            10
        );
    }

    #[test]
    fn withdrawal_emits_event() {
        let mut f = executed(&[("user1", 4), ("user2", 4)], 8);
        let user2 = Address::from_label("user2");
        withdraw(&mut f.state, &mut f.chain, user2, BatchIndex(0)).unwrap();
        assert_eq!(
            f.state.events,
            vec![BatchMintEvent::Withdrawn {
                user: user2,
                batch: BatchIndex(0),
                amount: 4,
            }]
        );
    }
}
