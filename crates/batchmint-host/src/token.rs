//! ERC-20-like token ledger.
//!
//! Balances, allowances and permit nonces for one token. All mutations are
//! checked before anything changes, so a failed call leaves the ledger as
//! it was.

use std::collections::HashMap;

use batchmint_types::{Address, Amount, BatchMintError, Result};

/// Allowance value treated as unlimited; pulls against it don't decrement it.
pub const UNLIMITED_ALLOWANCE: Amount = Amount::MAX;

/// State of one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    address: Address,
    symbol: String,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    permit_nonces: HashMap<Address, u64>,
}

impl TokenLedger {
    #[must_use]
    pub fn new(address: Address, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn balance_of(&self, owner: Address) -> Amount {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn permit_nonce(&self, holder: Address) -> u64 {
        self.permit_nonces.get(&holder).copied().unwrap_or(0)
    }

    /// Create `amount` new tokens for `to`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the supply would overflow.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| BatchMintError::ArithmeticOverflow(format!("{} supply", self.symbol)))?;
        // balance <= supply, so this cannot overflow once the supply didn't
        let balance = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if `from` holds less than `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(BatchMintError::InsufficientBalance {
                token: self.address,
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        self.balances.insert(from, available - amount);
        let credited = self.balance_of(to) + amount;
        self.balances.insert(to, credited);
        Ok(())
    }

    /// Pull `amount` from `from` to `to`, spending `spender`'s allowance.
    ///
    /// # Errors
    /// `InsufficientAllowance` or `InsufficientBalance`.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(BatchMintError::InsufficientAllowance {
                token: self.address,
                needed: amount,
                allowed,
            });
        }
        self.transfer(from, to, amount)?;
        if allowed != UNLIMITED_ALLOWANCE {
            self.allowances.insert((from, spender), allowed - amount);
        }
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Check `nonce` is `holder`'s next permit nonce and consume it.
    ///
    /// # Errors
    /// Returns `PermitNonceMismatch` otherwise.
    pub fn use_permit_nonce(&mut self, holder: Address, nonce: u64) -> Result<()> {
        let expected = self.permit_nonce(holder);
        if nonce != expected {
            return Err(BatchMintError::PermitNonceMismatch {
                expected,
                actual: nonce,
            });
        }
        self.permit_nonces.insert(holder, expected + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> TokenLedger {
        TokenLedger::new(Address::from_label("DAI"), "DAI")
    }

    #[test]
    fn mint_increases_balance_and_supply() {
        let mut t = token();
        let alice = Address::from_label("alice");
        t.mint(alice, 100).unwrap();
        t.mint(alice, 50).unwrap();
        assert_eq!(t.balance_of(alice), 150);
        assert_eq!(t.total_supply(), 150);
    }

    #[test]
    fn transfer_insufficient_leaves_balances() {
        let mut t = token();
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        t.mint(alice, 10).unwrap();
        let err = t.transfer(alice, bob, 11).unwrap_err();
        assert!(matches!(
            err,
            BatchMintError::InsufficientBalance {
                needed: 11,
                available: 10,
                ..
            }
        ));
        assert_eq!(t.balance_of(alice), 10);
        assert_eq!(t.balance_of(bob), 0);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut t = token();
        let alice = Address::from_label("alice");
        let pool = Address::from_label("pool");
        t.mint(alice, 100).unwrap();
        t.approve(alice, pool, 60);
        t.transfer_from(pool, alice, pool, 40).unwrap();
        assert_eq!(t.allowance(alice, pool), 20);
        assert_eq!(t.balance_of(pool), 40);
        assert!(t.transfer_from(pool, alice, pool, 21).is_err());
    }

    #[test]
    fn unlimited_allowance_not_decremented() {
        let mut t = token();
        let alice = Address::from_label("alice");
        let pool = Address::from_label("pool");
        t.mint(alice, 100).unwrap();
        t.approve(alice, pool, UNLIMITED_ALLOWANCE);
        t.transfer_from(pool, alice, pool, 70).unwrap();
        assert_eq!(t.allowance(alice, pool), UNLIMITED_ALLOWANCE);
    }

    #[test]
    fn failed_pull_keeps_allowance() {
        let mut t = token();
        let alice = Address::from_label("alice");
        let pool = Address::from_label("pool");
        t.mint(alice, 5).unwrap();
        t.approve(alice, pool, 50);
        assert!(t.transfer_from(pool, alice, pool, 10).is_err());
        assert_eq!(t.allowance(alice, pool), 50);
    }

    #[test]
    fn permit_nonces_sequential() {
        let mut t = token();
        let alice = Address::from_label("alice");
        t.use_permit_nonce(alice, 0).unwrap();
        assert!(matches!(
            t.use_permit_nonce(alice, 0),
            Err(BatchMintError::PermitNonceMismatch {
                expected: 1,
                actual: 0
            })
        ));
        assert_eq!(t.permit_nonce(alice), 1);
    }
}
