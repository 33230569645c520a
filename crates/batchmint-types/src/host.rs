//! Interfaces to the pool's external collaborators.
//!
//! The pool never owns token balances itself. Every token movement goes
//! through a host implementing these traits:
//!
//! - [`TokenHost`]: ERC-20-like ledgers, allowances and permit verification
//! - [`WrapperHost`]: the yield-bearing wrapper's mint interface
//! - [`Checkpoint`]: snapshot/restore so a failed call leaves no trace
//!
//! Hosts decide *how* a token mints or verifies a permit; the pool only
//! relies on the observable effects described here.

use chrono::{DateTime, Utc};

use crate::{Address, Amount, Permit, PermitSignature, Result};

/// ERC-20-like token operations plus the underlying's permit extension.
pub trait TokenHost {
    /// Current block time, used for permit deadlines.
    fn block_time(&self) -> DateTime<Utc>;

    /// Balance of `owner` on `token`.
    fn balance_of(&self, token: Address, owner: Address) -> Amount;

    /// Remaining allowance `owner` granted to `spender` on `token`.
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount;

    /// Move `amount` of `token` from `from` (the caller) to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance` or `UnknownToken`.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount)
    -> Result<()>;

    /// Pull `amount` of `token` from `from` to `to`, spending `spender`'s allowance.
    ///
    /// # Errors
    /// `InsufficientAllowance`, `InsufficientBalance` or `UnknownToken`.
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()>;

    /// Set the allowance `owner` grants to `spender` on `token`.
    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()>;

    /// Verify a signed permit and apply the allowance it grants.
    ///
    /// # Errors
    /// `PermitExpired`, `PermitNonceMismatch`, `PermitHolderMismatch`,
    /// `PermitSignatureInvalid` or `UnknownToken`.
    fn permit(&mut self, permit: &Permit, signature: &PermitSignature) -> Result<()>;
}

/// The yield-bearing wrapper token's interface.
pub trait WrapperHost: TokenHost {
    /// The underlying token the wrapper mints against.
    fn underlying_of(&self, wrapper: Address) -> Result<Address>;

    /// Pull `amount` of underlying from `minter` (which must have approved
    /// the wrapper) and mint wrapper shares to it.
    ///
    /// Returns the number of shares minted.
    fn mint_wrapped(&mut self, wrapper: Address, minter: Address, amount: Amount)
    -> Result<Amount>;

    /// Auxiliary reward tokens the wrapper's holdings accrue.
    fn gov_tokens(&self, wrapper: Address) -> Vec<Address>;
}

/// Snapshot/restore for all-or-nothing calls.
///
/// The pool takes a checkpoint before each state-changing call and restores
/// it if the call fails, so token movements made before the failure are
/// discarded along with the call's pool events.
pub trait Checkpoint {
    type Snapshot;

    /// Capture the host's current state.
    fn checkpoint(&self) -> Self::Snapshot;

    /// Return the host to a previously captured state.
    fn restore(&mut self, snapshot: Self::Snapshot);
}
