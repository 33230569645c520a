//! The `BatchedMint` pool.
//!
//! Users deposit underlying into the open batch. Anyone may execute the
//! batch, which mints the whole pool into wrapper shares at once. Each
//! depositor then withdraws their pro-rata share of the batch's mint.
//!
//! Every state-changing entry point takes the literal caller (`sender`)
//! and is atomic: on error, pool state and host are exactly as before.

use batchmint_ingress::{Ed25519SignerRecovery, SignerRecovery, TrustedForwarder};
use batchmint_types::{
    Address, Amount, BatchIndex, BatchMintConfig, BatchMintError, BatchMintEvent, BatchSummary,
    BatchTotals, Checkpoint, ExecutionReport, ForwardRequest, PermitSignature, Result, SweptToken,
    TokenHost, ValidatedDeposit, WrapperHost, constants,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::atomic::{transact, update};
use crate::state::PoolState;
use crate::{admin, executor, withdrawal};

/// A batched-mint pool bound to one wrapper token.
///
/// `R` decides who the depositor of a relayed call is.
#[derive(Debug, Clone)]
pub struct BatchedMint<R = Ed25519SignerRecovery> {
    state: PoolState,
    recovery: R,
}

impl BatchedMint {
    /// Create a pool at `address` for `wrapper`.
    ///
    /// The underlying is read from the wrapper. The fee treasury and an
    /// optional preset forwarder come from `config`.
    ///
    /// # Errors
    /// `Configuration` for an invalid config, `InvalidOwner` for a zero
    /// owner, or `UnknownToken` if `wrapper` isn't a wrapper on `host`.
    pub fn initialize<H: WrapperHost>(
        host: &H,
        address: Address,
        owner: Address,
        wrapper: Address,
        config: &BatchMintConfig,
    ) -> Result<Self> {
        config.validate()?;
        if owner.is_zero() {
            return Err(BatchMintError::InvalidOwner);
        }
        let underlying = host.underlying_of(wrapper)?;

        let mut state = PoolState::new(address, owner, underlying, wrapper, config.fee_treasury);
        state.emit(BatchMintEvent::OwnershipTransferred {
            previous: Address::ZERO,
            new_owner: owner,
        });
        if let Some(forwarder) = &config.forwarder {
            admin::install_forwarder(&mut state, &forwarder.version, forwarder.address)?;
        }

        info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            pool = %address,
            owner = %owner,
            underlying = %underlying,
            wrapper = %wrapper,
            treasury = %config.fee_treasury,
            "Pool initialized"
        );
        Ok(Self {
            state,
            recovery: Ed25519SignerRecovery,
        })
    }

    /// Reload a pool from [`BatchedMint::snapshot_json`] output.
    ///
    /// # Errors
    /// Returns `Serialization` if the snapshot doesn't parse, or `Internal`
    /// if its ledger fails the conservation check.
    pub fn restore_json(json: &str) -> Result<Self> {
        let state: PoolState = serde_json::from_str(json)?;
        state.ledger.verify_conservation()?;
        Ok(Self {
            state,
            recovery: Ed25519SignerRecovery,
        })
    }
}

impl<R: SignerRecovery> BatchedMint<R> {
    /// Swap the relay protocol's signer recovery.
    #[must_use]
    pub fn with_recovery<S: SignerRecovery>(self, recovery: S) -> BatchedMint<S> {
        BatchedMint {
            state: self.state,
            recovery,
        }
    }

    // ---------------------------------------------------------------
    // Deposits
    // ---------------------------------------------------------------

    /// Direct-pull deposit of `amount` against `sender`'s existing allowance.
    ///
    /// # Errors
    /// `Paused`, `ZeroAmount`, or the token's allowance/balance errors.
    pub fn deposit<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
        amount: Amount,
    ) -> Result<BatchIndex> {
        transact(&mut self.state, host, "deposit", |state, host| {
            state.ensure_not_paused()?;
            let deposit = state.authorizer.admit_direct(host, sender, amount)?;
            record(state, &deposit)
        })
    }

    /// Deposit authorized by a signed permit (holder = `sender`, spender =
    /// this pool, unlimited allowance) in the same call.
    ///
    /// # Errors
    /// `Paused`, `ZeroAmount`, any permit error, or a pull error.
    pub fn permit_and_deposit<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
        amount: Amount,
        nonce: u64,
        deadline: DateTime<Utc>,
        signature: &PermitSignature,
    ) -> Result<BatchIndex> {
        transact(&mut self.state, host, "permit_and_deposit", |state, host| {
            state.ensure_not_paused()?;
            let deposit =
                state
                    .authorizer
                    .admit_permit(host, sender, amount, nonce, deadline, signature)?;
            record(state, &deposit)
        })
    }

    /// Deposit relayed by the trusted forwarder `sender`; credited to the
    /// request's signer.
    ///
    /// # Errors
    /// `Paused`, any relay authorization error, then the errors of the
    /// relayed action.
    pub fn relayed_deposit<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
        request: &ForwardRequest,
    ) -> Result<BatchIndex> {
        let recovery = &self.recovery;
        transact(&mut self.state, host, "relayed_deposit", |state, host| {
            state.ensure_not_paused()?;
            let admission = state
                .authorizer
                .admit_relayed(host, recovery, sender, request)?;
            let batch = record(state, &admission.deposit)?;
            state.authorizer.settle_relay(admission);
            Ok(batch)
        })
    }

    // ---------------------------------------------------------------
    // Execution & withdrawal
    // ---------------------------------------------------------------

    /// Close the open batch and open the next. Callable by anyone.
    ///
    /// With `sweep`, also runs [`BatchedMint::withdraw_gov_tokens`] in the
    /// same call.
    ///
    /// # Errors
    /// `Paused`, or any approve/mint/sweep error.
    pub fn execute_batch<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
        sweep: bool,
    ) -> Result<ExecutionReport> {
        debug!(by = %sender, sweep, "Executing batch");
        transact(&mut self.state, host, "execute_batch", |state, host| {
            executor::execute_batch(state, host, sweep)
        })
    }

    /// Pay `sender` their share of executed `batch`.
    ///
    /// Returns 0 without changing anything if `batch` is still open or
    /// `sender` has nothing outstanding in it.
    ///
    /// # Errors
    /// `Paused`, or a transfer error.
    pub fn withdraw<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
        batch: BatchIndex,
    ) -> Result<Amount> {
        transact(&mut self.state, host, "withdraw", |state, host| {
            withdrawal::withdraw(state, host, sender, batch)
        })
    }

    /// Sweep governance tokens to the fee treasury. Callable by anyone.
    ///
    /// # Errors
    /// `Paused`, or a transfer error.
    pub fn withdraw_gov_tokens<H: WrapperHost + Checkpoint>(
        &mut self,
        host: &mut H,
        sender: Address,
    ) -> Result<Vec<SweptToken>> {
        debug!(by = %sender, "Sweeping governance tokens");
        transact(&mut self.state, host, "withdraw_gov_tokens", |state, host| {
            admin::sweep_gov_tokens(state, host)
        })
    }

    // ---------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------

    /// # Errors
    /// `NotOwner` or `Paused`.
    pub fn pause(&mut self, sender: Address) -> Result<()> {
        update(&mut self.state, "pause", |state| admin::pause(state, sender))
    }

    /// # Errors
    /// `NotOwner` or `NotPaused`.
    pub fn unpause(&mut self, sender: Address) -> Result<()> {
        update(&mut self.state, "unpause", |state| admin::unpause(state, sender))
    }

    /// One-time trusted forwarder setup.
    ///
    /// # Errors
    /// `NotOwner` or `ForwarderAlreadyInitialized`.
    pub fn init_trusted_forwarder(
        &mut self,
        sender: Address,
        version: &str,
        forwarder: Address,
    ) -> Result<()> {
        update(&mut self.state, "init_trusted_forwarder", |state| {
            admin::init_trusted_forwarder(state, sender, version, forwarder)
        })
    }

    /// # Errors
    /// `NotOwner` or `InvalidOwner`.
    pub fn transfer_ownership(&mut self, sender: Address, new_owner: Address) -> Result<()> {
        update(&mut self.state, "transfer_ownership", |state| {
            admin::transfer_ownership(state, sender, new_owner)
        })
    }

    // ---------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Address {
        self.state.pool()
    }

    #[must_use]
    pub fn current_batch_index(&self) -> BatchIndex {
        self.state.ledger.current_batch_index()
    }

    #[must_use]
    pub fn batch(&self, batch: BatchIndex) -> BatchSummary {
        self.state.ledger.batch(batch)
    }

    #[must_use]
    pub fn batch_totals(&self, batch: BatchIndex) -> BatchTotals {
        let summary = self.state.ledger.batch(batch);
        BatchTotals {
            total_deposited: summary.total_deposited,
            total_minted: summary.total_minted,
        }
    }

    #[must_use]
    pub fn batch_total_deposited(&self, batch: BatchIndex) -> Amount {
        self.state.ledger.batch_total(batch)
    }

    #[must_use]
    pub fn batch_total_minted(&self, batch: BatchIndex) -> Amount {
        self.state.ledger.batch_minted(batch)
    }

    /// Outstanding deposit of `user` in `batch` (0 after withdrawal).
    #[must_use]
    pub fn batch_deposits(&self, user: Address, batch: BatchIndex) -> Amount {
        self.state.ledger.batch_deposit(user, batch)
    }

    /// What `withdraw` would pay `user` from `batch` right now.
    ///
    /// # Errors
    /// Returns `Internal` only if the ledger is corrupt.
    pub fn preview_withdraw(&self, user: Address, batch: BatchIndex) -> Result<Amount> {
        self.state.ledger.preview_claim(user, batch)
    }

    #[must_use]
    pub fn underlying(&self) -> Address {
        self.state.underlying
    }

    #[must_use]
    pub fn wrapper(&self) -> Address {
        self.state.wrapper
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.state.owner
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.state.paused
    }

    #[must_use]
    pub fn fee_treasury(&self) -> Address {
        self.state.fee_treasury
    }

    #[must_use]
    pub fn is_trusted_forwarder(&self, address: Address) -> bool {
        self.state.authorizer.forwarder().is_trusted(address)
    }

    #[must_use]
    pub fn trusted_forwarder(&self) -> Option<&TrustedForwarder> {
        self.state.authorizer.forwarder().trusted()
    }

    /// Version tag reported to relayers. Empty until a forwarder is set.
    #[must_use]
    pub fn version_recipient(&self) -> &str {
        self.state
            .authorizer
            .forwarder()
            .version_recipient()
            .unwrap_or_default()
    }

    /// Nonce `signer`'s next forward request must carry.
    #[must_use]
    pub fn relay_nonce(&self, signer: Address) -> u64 {
        self.state.authorizer.relay_nonces().next_nonce(signer)
    }

    /// Events of all committed calls, oldest first.
    #[must_use]
    pub fn events(&self) -> &[BatchMintEvent] {
        &self.state.events
    }

    // ---------------------------------------------------------------
    // Persistence & audit
    // ---------------------------------------------------------------

    /// Serialize the full pool state.
    ///
    /// # Errors
    /// Returns `Serialization` if encoding fails.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Check that `host` backs everything the ledger says the pool owes:
    /// the unpaid shares of every executed batch, and the underlying of
    /// the open batch.
    ///
    /// # Errors
    /// Returns `Internal` describing the first shortfall, or a ledger
    /// conservation violation.
    pub fn verify_solvency<H: TokenHost>(&self, host: &H) -> Result<()> {
        let ledger = &self.state.ledger;
        ledger.verify_conservation()?;

        let pool = self.address();
        let current = ledger.current_batch_index();
        let mut owed_shares: Amount = 0;
        for index in 0..current.0 {
            let batch = BatchIndex(index);
            let unpaid = ledger
                .batch_minted(batch)
                .saturating_sub(ledger.batch_paid_out(batch));
            owed_shares = owed_shares.checked_add(unpaid).ok_or_else(|| {
                BatchMintError::ArithmeticOverflow("owed wrapper shares".into())
            })?;
        }

        let held_shares = host.balance_of(self.state.wrapper, pool);
        if held_shares < owed_shares {
            error!(held_shares, owed_shares, "Pool is short of wrapper shares");
            return Err(BatchMintError::Internal(format!(
                "pool holds {held_shares} wrapper shares but owes {owed_shares}"
            )));
        }

        let pending = ledger.batch_total(current);
        let held_underlying = host.balance_of(self.state.underlying, pool);
        if held_underlying < pending {
            error!(held_underlying, pending, "Pool is short of underlying");
            return Err(BatchMintError::Internal(format!(
                "pool holds {held_underlying} underlying but {current} holds {pending}"
            )));
        }
        Ok(())
    }
}

fn record(state: &mut PoolState, deposit: &ValidatedDeposit) -> Result<BatchIndex> {
    let batch = state.ledger.record_deposit(deposit)?;
    state.emit(BatchMintEvent::Deposited {
        depositor: deposit.depositor,
        batch,
        amount: deposit.amount,
        path: deposit.path,
    });
    debug!(
        depositor = %deposit.depositor,
        batch = batch.0,
        amount = deposit.amount,
        path = %deposit.path,
        "Deposit recorded"
    );
    Ok(batch)
}
