//! In-memory chain implementing the pool's host interfaces.
//!
//! Holds every token ledger and wrapper market in one place, with a
//! settable block time. Cloning the chain is its checkpoint.

use std::collections::BTreeMap;

use batchmint_types::{
    Address, Amount, BatchMintError, Checkpoint, Permit, PermitSignature, Result, TokenHost,
    WrapperHost,
};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::token::{TokenLedger, UNLIMITED_ALLOWANCE};
use crate::wrapper::{ExchangeRate, WrapperMarket};

/// Tokens, wrappers and a clock.
#[derive(Debug, Clone)]
pub struct InMemoryChain {
    tokens: BTreeMap<Address, TokenLedger>,
    wrappers: BTreeMap<Address, WrapperMarket>,
    now: DateTime<Utc>,
}

impl InMemoryChain {
    /// Empty chain whose clock starts at the current wall time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: BTreeMap::new(),
            wrappers: BTreeMap::new(),
            now: Utc::now(),
        }
    }

    /// Deploy a plain token at the address derived from `symbol`.
    ///
    /// Deploying the same symbol twice returns the existing token.
    pub fn deploy_token(&mut self, symbol: &str) -> Address {
        let address = Address::from_label(symbol);
        self.tokens
            .entry(address)
            .or_insert_with(|| TokenLedger::new(address, symbol));
        address
    }

    /// Deploy a wrapper token over `underlying`, minting at par.
    ///
    /// # Errors
    /// Returns `UnknownToken` if `underlying` isn't deployed.
    pub fn deploy_wrapper(&mut self, symbol: &str, underlying: Address) -> Result<Address> {
        self.token(underlying)?;
        let address = self.deploy_token(symbol);
        self.wrappers
            .entry(address)
            .or_insert_with(|| WrapperMarket::new(underlying));
        Ok(address)
    }

    /// Credit `amount` of `token` to `to` out of thin air.
    ///
    /// # Errors
    /// `UnknownToken` or `ArithmeticOverflow`.
    pub fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()> {
        self.token_mut(token)?.mint(to, amount)
    }

    /// # Errors
    /// Returns `UnknownToken` if `wrapper` isn't a deployed wrapper.
    pub fn set_exchange_rate(&mut self, wrapper: Address, rate: ExchangeRate) -> Result<()> {
        self.market_mut(wrapper)?.rate = rate;
        Ok(())
    }

    /// Set the governance tokens the wrapper reports.
    ///
    /// # Errors
    /// `UnknownToken` if `wrapper` or any listed token isn't deployed.
    pub fn set_gov_tokens(&mut self, wrapper: Address, gov_tokens: Vec<Address>) -> Result<()> {
        for token in &gov_tokens {
            self.token(*token)?;
        }
        self.market_mut(wrapper)?.gov_tokens = gov_tokens;
        Ok(())
    }

    /// Make every later mint on `wrapper` fail with `reason`, or reopen it.
    ///
    /// # Errors
    /// Returns `UnknownToken` if `wrapper` isn't a deployed wrapper.
    pub fn set_mint_halted(&mut self, wrapper: Address, reason: Option<&str>) -> Result<()> {
        self.market_mut(wrapper)?.halted = reason.map(str::to_string);
        Ok(())
    }

    pub fn set_block_time(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance_time(&mut self, by: Duration) {
        self.now += by;
    }

    /// Next permit nonce of `holder` on `token`. Zero for unknown tokens.
    #[must_use]
    pub fn permit_nonce(&self, token: Address, holder: Address) -> u64 {
        self.tokens
            .get(&token)
            .map_or(0, |t| t.permit_nonce(holder))
    }

    /// Total supply of `token`. Zero for unknown tokens.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> Amount {
        self.tokens.get(&token).map_or(0, TokenLedger::total_supply)
    }

    fn token(&self, token: Address) -> Result<&TokenLedger> {
        self.tokens
            .get(&token)
            .ok_or(BatchMintError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenLedger> {
        self.tokens
            .get_mut(&token)
            .ok_or(BatchMintError::UnknownToken(token))
    }

    fn market(&self, wrapper: Address) -> Result<&WrapperMarket> {
        self.wrappers
            .get(&wrapper)
            .ok_or(BatchMintError::UnknownToken(wrapper))
    }

    fn market_mut(&mut self, wrapper: Address) -> Result<&mut WrapperMarket> {
        self.wrappers
            .get_mut(&wrapper)
            .ok_or(BatchMintError::UnknownToken(wrapper))
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenHost for InMemoryChain {
    fn block_time(&self) -> DateTime<Utc> {
        self.now
    }

    fn balance_of(&self, token: Address, owner: Address) -> Amount {
        self.tokens.get(&token).map_or(0, |t| t.balance_of(owner))
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.tokens
            .get(&token)
            .map_or(0, |t| t.allowance(owner, spender))
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.token_mut(token)?.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.token_mut(token)?
            .transfer_from(spender, from, to, amount)
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        self.token_mut(token)?.approve(owner, spender, amount);
        Ok(())
    }

    fn permit(&mut self, permit: &Permit, signature: &PermitSignature) -> Result<()> {
        let now = self.now;
        let ledger = self.token_mut(permit.token)?;

        // 1. Deadline
        if permit.is_expired(now) {
            return Err(BatchMintError::PermitExpired);
        }

        // 2. Signing key must control the holder address
        if signature.signer() != permit.holder {
            return Err(BatchMintError::PermitHolderMismatch);
        }

        // 3. Signature over the exact permit fields
        if !signature.verifies(permit) {
            return Err(BatchMintError::PermitSignatureInvalid);
        }

        // 4. Nonce is consumed only once everything else checked out
        ledger.use_permit_nonce(permit.holder, permit.nonce)?;

        let allowance = if permit.allowed {
            UNLIMITED_ALLOWANCE
        } else {
            0
        };
        ledger.approve(permit.holder, permit.spender, allowance);
        debug!(
            token = %permit.token,
            holder = %permit.holder,
            spender = %permit.spender,
            allowed = permit.allowed,
            "Permit applied"
        );
        Ok(())
    }
}

impl WrapperHost for InMemoryChain {
    fn underlying_of(&self, wrapper: Address) -> Result<Address> {
        self.market(wrapper).map(|m| m.underlying)
    }

    fn mint_wrapped(
        &mut self,
        wrapper: Address,
        minter: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let market = self.market(wrapper)?;
        market.ensure_open()?;
        let underlying = market.underlying;
        let shares = market.rate.shares_for(amount)?;

        // Pull first; a failed pull leaves the share ledger untouched.
        // Amounts that round down to zero shares are still taken.
        self.token_mut(underlying)?
            .transfer_from(wrapper, minter, wrapper, amount)?;
        if shares > 0 {
            self.token_mut(wrapper)?.mint(minter, shares)?;
        }

        debug!(
            wrapper = %wrapper,
            minter = %minter,
            amount,
            shares,
            "Wrapper shares minted"
        );
        Ok(shares)
    }

    fn gov_tokens(&self, wrapper: Address) -> Vec<Address> {
        self.wrappers
            .get(&wrapper)
            .map(|m| m.gov_tokens.clone())
            .unwrap_or_default()
    }
}

impl Checkpoint for InMemoryChain {
    type Snapshot = Self;

    fn checkpoint(&self) -> Self::Snapshot {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self = snapshot;
    }
}
