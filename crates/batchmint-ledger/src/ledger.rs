//! The batch ledger: per-user-per-batch deposits and per-batch totals.
//!
//! Mathematical invariant, checked by [`BatchLedger::verify_conservation`]:
//! ```text
//! ∀ batch: Σ outstanding(user, batch) + claimed_deposits(batch) == total_deposited(batch)
//!          paid_out(batch) <= total_minted(batch)
//! ```
//! Before any withdrawal, `claimed_deposits == 0` and this reduces to
//! `Σ deposits == total_deposited`.

use std::collections::BTreeMap;

use batchmint_types::{
    Address, Amount, BatchIndex, BatchMintError, BatchSummary, BatchTotals, Result,
    ValidatedDeposit,
};
use serde::{Deserialize, Serialize};

use crate::distribution::pro_rata_share;

/// A withdrawal computed and applied by [`BatchLedger::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub batch: BatchIndex,
    /// The user's deposit that was zeroed.
    pub share: Amount,
    /// Wrapper shares owed to the user.
    pub owed: Amount,
}

/// Running withdrawal totals for one executed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct ClaimTotals {
    /// Deposits zeroed by withdrawals.
    deposits_claimed: Amount,
    /// Wrapper shares paid out.
    paid_out: Amount,
}

/// Source of truth for all batch accounting.
///
/// Deposits only ever land in `current`. Sealing a batch records its minted
/// total once and moves `current` forward by exactly one.
///
/// The serialized layout is append-only: fields added later must default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLedger {
    /// The open batch.
    current: BatchIndex,
    /// Per-batch totals, created on first deposit or on sealing.
    batches: BTreeMap<BatchIndex, BatchTotals>,
    /// `batch → user → outstanding deposit`.
    deposits: BTreeMap<BatchIndex, BTreeMap<Address, Amount>>,
    #[serde(default)]
    claims: BTreeMap<BatchIndex, ClaimTotals>,
}

impl BatchLedger {
    /// Create an empty ledger with batch 0 open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently open batch.
    #[must_use]
    pub fn current_batch_index(&self) -> BatchIndex {
        self.current
    }

    /// Whether `batch` has been executed.
    #[must_use]
    pub fn is_executed(&self, batch: BatchIndex) -> bool {
        batch < self.current
    }

    /// Record a validated deposit against the open batch.
    ///
    /// Both the user's entry and the batch total are updated, or neither.
    ///
    /// # Errors
    /// - `ZeroAmount` if the deposit is zero
    /// - `ArithmeticOverflow` if either running total would overflow
    pub fn record_deposit(&mut self, deposit: &ValidatedDeposit) -> Result<BatchIndex> {
        if deposit.amount == 0 {
            return Err(BatchMintError::ZeroAmount);
        }
        let batch = self.current;

        let user_total = self
            .batch_deposit(deposit.depositor, batch)
            .checked_add(deposit.amount)
            .ok_or_else(|| overflow("user batch deposit", batch))?;
        let batch_total = self
            .totals(batch)
            .total_deposited
            .checked_add(deposit.amount)
            .ok_or_else(|| overflow("batch total deposited", batch))?;

        self.deposits
            .entry(batch)
            .or_default()
            .insert(deposit.depositor, user_total);
        self.batches.entry(batch).or_default().total_deposited = batch_total;
        Ok(batch)
    }

    /// Seal the open batch with the wrapper shares its pool produced, then
    /// open the next batch.
    ///
    /// # Errors
    /// Returns `Internal` if shares are reported for a batch with no deposits.
    pub fn seal_current(&mut self, total_minted: Amount) -> Result<BatchSummary> {
        let batch = self.current;
        let mut sealed = self.totals(batch);
        if sealed.total_deposited == 0 && total_minted != 0 {
            return Err(BatchMintError::Internal(format!(
                "{batch} has no deposits but {total_minted} shares were minted"
            )));
        }
        sealed.total_minted = total_minted;
        self.batches.insert(batch, sealed);
        self.current = batch.next();

        Ok(BatchSummary {
            index: batch,
            total_deposited: sealed.total_deposited,
            total_minted: sealed.total_minted,
            executed: true,
        })
    }

    /// What `user` would receive by withdrawing from `batch` now.
    ///
    /// 0 if the batch is still open or the user has nothing outstanding.
    pub fn preview_claim(&self, user: Address, batch: BatchIndex) -> Result<Amount> {
        if !self.is_executed(batch) {
            return Ok(0);
        }
        let share = self.batch_deposit(user, batch);
        if share == 0 {
            return Ok(0);
        }
        let totals = self.totals(batch);
        pro_rata_share(totals.total_minted, share, totals.total_deposited)
    }

    /// Compute `user`'s payout from `batch` and zero their entry.
    ///
    /// Returns `None` (and changes nothing) if the batch is still open or
    /// the user has nothing outstanding. The entry is zeroed here, before
    /// the caller moves any tokens.
    pub fn claim(&mut self, user: Address, batch: BatchIndex) -> Result<Option<Claim>> {
        if !self.is_executed(batch) {
            return Ok(None);
        }
        let share = self.batch_deposit(user, batch);
        if share == 0 {
            return Ok(None);
        }
        let totals = self.totals(batch);
        let owed = pro_rata_share(totals.total_minted, share, totals.total_deposited)?;

        let claim_totals = self.claims.get(&batch).copied().unwrap_or_default();
        let deposits_claimed = claim_totals
            .deposits_claimed
            .checked_add(share)
            .ok_or_else(|| overflow("claimed deposits", batch))?;
        let paid_out = claim_totals
            .paid_out
            .checked_add(owed)
            .ok_or_else(|| overflow("paid out", batch))?;

        if let Some(entry) = self
            .deposits
            .get_mut(&batch)
            .and_then(|users| users.get_mut(&user))
        {
            *entry = 0;
        }
        self.claims.insert(
            batch,
            ClaimTotals {
                deposits_claimed,
                paid_out,
            },
        );

        Ok(Some(Claim { batch, share, owed }))
    }

    /// Reinstate `user`'s most recent claim after its payout failed.
    pub fn restore_claim(&mut self, user: Address, claim: &Claim) {
        if let Some(entry) = self
            .deposits
            .get_mut(&claim.batch)
            .and_then(|users| users.get_mut(&user))
        {
            *entry = claim.share;
        }
        if let Some(totals) = self.claims.get_mut(&claim.batch) {
            totals.deposits_claimed = totals.deposits_claimed.saturating_sub(claim.share);
            totals.paid_out = totals.paid_out.saturating_sub(claim.owed);
            if *totals == ClaimTotals::default() {
                self.claims.remove(&claim.batch);
            }
        }
    }

    /// Outstanding deposit of `user` in `batch`.
    #[must_use]
    pub fn batch_deposit(&self, user: Address, batch: BatchIndex) -> Amount {
        self.deposits
            .get(&batch)
            .and_then(|users| users.get(&user))
            .copied()
            .unwrap_or(0)
    }

    /// Total underlying deposited into `batch`.
    #[must_use]
    pub fn batch_total(&self, batch: BatchIndex) -> Amount {
        self.totals(batch).total_deposited
    }

    /// Wrapper shares minted for `batch` (0 until executed).
    #[must_use]
    pub fn batch_minted(&self, batch: BatchIndex) -> Amount {
        self.totals(batch).total_minted
    }

    /// Wrapper shares already paid out of `batch`.
    #[must_use]
    pub fn batch_paid_out(&self, batch: BatchIndex) -> Amount {
        self.claims.get(&batch).map_or(0, |c| c.paid_out)
    }

    /// Full view of `batch`.
    #[must_use]
    pub fn batch(&self, batch: BatchIndex) -> BatchSummary {
        let totals = self.totals(batch);
        BatchSummary {
            index: batch,
            total_deposited: totals.total_deposited,
            total_minted: totals.total_minted,
            executed: self.is_executed(batch),
        }
    }

    /// Users with an entry (possibly zeroed) in `batch`, in address order.
    #[must_use]
    pub fn depositors(&self, batch: BatchIndex) -> Vec<Address> {
        self.deposits
            .get(&batch)
            .map(|users| users.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Verify the conservation invariant for every batch.
    ///
    /// # Errors
    /// Returns `Internal` naming the first batch that violates it, or
    /// `ArithmeticOverflow` if a batch's entries don't fit in an amount.
    pub fn verify_conservation(&self) -> Result<()> {
        for (batch, totals) in &self.batches {
            let outstanding = self
                .deposits
                .get(batch)
                .into_iter()
                .flat_map(BTreeMap::values)
                .try_fold(0, |sum: Amount, amount| sum.checked_add(*amount))
                .ok_or_else(|| overflowed_entries(*batch))?;
            let claims = self.claims.get(batch).copied().unwrap_or_default();
            let accounted = outstanding
                .checked_add(claims.deposits_claimed)
                .ok_or_else(|| overflowed_entries(*batch))?;

            if accounted != totals.total_deposited {
                tracing::error!(
                    batch = batch.0,
                    outstanding,
                    claimed = claims.deposits_claimed,
                    total_deposited = totals.total_deposited,
                    "Batch deposit conservation violated"
                );
                return Err(BatchMintError::Internal(format!(
                    "{batch}: outstanding {outstanding} + claimed {} != deposited {}",
                    claims.deposits_claimed, totals.total_deposited
                )));
            }
            if claims.paid_out > totals.total_minted {
                tracing::error!(
                    batch = batch.0,
                    paid_out = claims.paid_out,
                    total_minted = totals.total_minted,
                    "Batch over-distributed"
                );
                return Err(BatchMintError::Internal(format!(
                    "{batch}: paid out {} exceeds minted {}",
                    claims.paid_out, totals.total_minted
                )));
            }
        }
        Ok(())
    }

    fn totals(&self, batch: BatchIndex) -> BatchTotals {
        self.batches.get(&batch).copied().unwrap_or_default()
    }
}

fn overflow(what: &str, batch: BatchIndex) -> BatchMintError {
    BatchMintError::ArithmeticOverflow(format!("{what} in {batch}"))
}

fn overflowed_entries(batch: BatchIndex) -> BatchMintError {
    tracing::error!(batch = batch.0, "Batch entries overflow an amount");
    overflow("outstanding plus claimed deposits", batch)
}
